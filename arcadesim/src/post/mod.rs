pub mod scores;
pub mod session_result;
