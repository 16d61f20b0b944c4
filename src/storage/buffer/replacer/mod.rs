mod policy;

pub use policy::ReplacementPolicy;
