// handlers/mod.rs - one module per API resource
//
// Every handler follows the same pipeline: role check where required, path
// id parsing, body/query validation, sanitization, then delegation to the
// named registry procedure. Authentication already happened in middleware.

pub mod customers;
pub mod group_networks;
pub mod payment_conditions;
pub mod sellers;
pub mod support;
pub mod users;
