pub mod domain {
    pub mod errors;
    pub mod models;
    pub mod schema;
    pub mod types;
}

pub mod app {
    pub mod ports;
    pub mod projector;
    pub mod registry;
    pub mod resolver;
    pub mod tool_usecases;
}

pub mod adapters {
    pub mod catalog_file;
    pub mod mcp_stdio;
    pub mod unbound_executor;
}
