//! Host environment identification for the report header.
//!
//! Collected once before the sweep starts and never refreshed; a sweep's
//! header describes the machine it started on.

use sysinfo::System;

/// Host facts written into the report header.
#[derive(Debug, Clone)]
pub struct HostInfo {
    /// CPU brand string, e.g. "Intel(R) Core(TM) i7-1185G7 @ 3.00GHz".
    pub cpu: String,
    /// Total physical memory in bytes.
    pub memory_bytes: u64,
    /// OS name, version and kernel.
    pub os: String,
}

pub fn collect() -> HostInfo {
    let system = System::new_all();

    let cpu = system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let os = format!(
        "{} {} ({})",
        System::name().unwrap_or_else(|| "unknown".to_string()),
        System::os_version().unwrap_or_else(|| "unknown".to_string()),
        System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
    );

    HostInfo {
        cpu,
        memory_bytes: system.total_memory(),
        os,
    }
}
