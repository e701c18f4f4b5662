mod conversions;
mod predicates;
mod set;
mod transformations;
