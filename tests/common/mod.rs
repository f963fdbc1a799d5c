pub mod mockup;
