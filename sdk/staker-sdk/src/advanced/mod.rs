pub mod instructions;
pub mod serializer;
