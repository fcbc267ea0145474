/// Integration tests against on-disk databases and the MCP request loop
mod basic_integration;
mod mcp_workflow;
