/*!
 * Unit tests for provider implementations
 */

// Provider unit tests
pub mod claude_test;
pub mod gemini_test;
