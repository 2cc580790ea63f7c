pub mod evaluation_controller;
