/// logger initialisation shared by the binary, examples and tests
pub mod logger;
/// rational approximation of floats, gcd/lcm of integer sets and rounding helpers
pub mod rational;
