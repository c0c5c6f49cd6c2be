// Résumé generation: turns a record into downloadable .tex and .pdf files.

pub mod handlers;
pub mod pipeline;
