pub mod entities;
pub mod password;
pub mod session_gate;
pub mod use_cases;
