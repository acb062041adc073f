mod process;
mod reader;
mod resolver;

#[cfg(test)]
pub mod mock;

pub use process::*;
pub use reader::{ReadMemory, Scalar};
pub use resolver::{AddressResolver, OffsetChain, PointerWidth};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
