pub mod debugger_agent;
pub mod memory_agent;
pub mod mock_agent;
pub mod terminal_proxy;
pub mod tool_agent;

pub use debugger_agent::DebuggerActions;
pub use memory_agent::MemoryActions;
pub use mock_agent::MockAgent;
pub use terminal_proxy::{CommandFilter, TerminalProxyActions};
pub use tool_agent::{ToolAction, ToolActions, ToolStep};
