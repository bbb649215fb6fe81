// handlers/mod.rs - HTTP handlers
//
// system: public root and health endpoints
// todos:  per-user todo CRUD, JWT authentication required (/api/todos)

pub mod system;
pub mod todos;
