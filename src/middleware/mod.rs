/*
 * Responsibility
 * - Public surface of the middleware
 */
pub mod http;
