pub mod aggregate;
pub mod dump;
pub mod error;
pub mod frame;
pub mod locate;
pub mod model;
pub mod symbol;

#[cfg(test)]
mod dump_test;

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
