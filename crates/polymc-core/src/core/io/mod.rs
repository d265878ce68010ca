pub mod restart;
pub mod topology_dump;
pub mod traits;
pub mod xyz;
