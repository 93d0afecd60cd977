//! Built-in capability implementations.
//!
//! Each plugin exposes a `NAME` constant and a `factory` entry point; the
//! registry seeds its symbol tables from the `builtin_*` lists below. Nothing
//! here is discovered by reflection, registration is explicit.

pub mod managers;
pub mod probes;
pub mod reporters;
pub mod scanners;

use meshprobe_common::capability::{
    ManagerFactory, ProbeFactory, ReporterFactory, ScannerFactory,
};

pub fn builtin_scanners() -> Vec<(&'static str, ScannerFactory)> {
    vec![
        (scanners::csv::NAME, scanners::csv::factory as ScannerFactory),
        (scanners::arp::NAME, scanners::arp::factory as ScannerFactory),
    ]
}

pub fn builtin_probes() -> Vec<(&'static str, ProbeFactory)> {
    vec![(probes::ping::NAME, probes::ping::factory as ProbeFactory)]
}

pub fn builtin_managers() -> Vec<(&'static str, ManagerFactory)> {
    vec![
        (
            managers::sequential::NAME,
            managers::sequential::factory as ManagerFactory,
        ),
        (
            managers::topology::ALL_TO_ALL,
            managers::topology::all_to_all_factory as ManagerFactory,
        ),
        (
            managers::topology::INTER_SWITCH,
            managers::topology::inter_switch_factory as ManagerFactory,
        ),
        (
            managers::topology::INTRA_SWITCH,
            managers::topology::intra_switch_factory as ManagerFactory,
        ),
    ]
}

pub fn builtin_reporters() -> Vec<(&'static str, ReporterFactory)> {
    vec![
        (
            reporters::csv::NAME,
            reporters::csv::factory as ReporterFactory,
        ),
        (
            reporters::json::NAME,
            reporters::json::factory as ReporterFactory,
        ),
    ]
}
