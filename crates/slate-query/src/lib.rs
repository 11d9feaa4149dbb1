pub mod mutation;

pub use mutation::{FieldMutation, Mutation, MutationOp, ParseError, parse_mutation};
