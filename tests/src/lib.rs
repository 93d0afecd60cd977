//! End-to-end tests driving the full pipeline: spec file in, report out.

#[cfg(test)]
mod pipeline;
