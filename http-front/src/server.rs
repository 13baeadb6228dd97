pub mod http;

pub use self::http::boot_mcp_front_server;
