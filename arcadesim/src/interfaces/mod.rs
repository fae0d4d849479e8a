pub mod frontend_interface;
