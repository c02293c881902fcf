mod batch;
mod invariants;
mod scenarios;
