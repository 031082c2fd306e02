// ABOUTME: Version and prompt constants for the interpreter surface

pub const VERSION: &str = "1.0.0";

/// Prompt for a fresh top-level expression
pub const PROMPT: &str = "> ";

/// Prompt while a multi-line expression is still open
pub const CONTINUE_PROMPT: &str = "| ";

/// Printed when the interactive loop sees end of input
pub const GOODBYE: &str = "Goodbye";
