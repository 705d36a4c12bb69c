/// Integration tests driving the server the way an MCP client does
mod mcp_workflow;
mod persistence;
