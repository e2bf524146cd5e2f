//! Teachable machine: teach a camera new classes with physical buttons.
//!
//! Each camera frame is turned into an embedding, classified against the
//! examples taught so far by k-nearest-neighbours, and smoothed over the
//! last few frames.  Button 0 forgets every example; buttons 1-4 teach the
//! current frame as that class; pressing all four class buttons together
//! ends the program cleanly.  The LED of the recognised class lights up.

pub mod camera;
pub mod cli;
pub mod config;
pub mod engine;
pub mod input;
pub mod interrupt;
pub mod machine;
pub mod stats;
pub mod ui;
