//! CPU topology detection for pinning benchmark workers.
//!
//! Workers are spread over one logical CPU per physical core, excluding
//! core 0 which is left to the system and the runner thread.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Get a list of usable CPU cores for worker pinning.
///
/// Returns one logical CPU per physical core, excluding core 0.
/// Falls back to every logical CPU but 0 (or just CPU 0 on a single-CPU
/// machine) if sysfs topology is unavailable.
pub fn get_usable_cores() -> Vec<usize> {
    match detect_physical_cores() {
        Ok(cores) if !cores.is_empty() => cores,
        _ => fallback_cores(get_cpu_count()),
    }
}

fn fallback_cores(cpu_count: usize) -> Vec<usize> {
    if cpu_count <= 1 {
        vec![0]
    } else {
        (1..cpu_count).collect()
    }
}

/// Detect physical cores by reading sysfs topology information.
///
/// On Linux, reads /sys/devices/system/cpu/cpuN/topology/thread_siblings_list
/// to identify which logical CPUs share a physical core (hyperthreading).
fn detect_physical_cores() -> Result<Vec<usize>, std::io::Error> {
    let cpu_base = Path::new("/sys/devices/system/cpu");

    if !cpu_base.exists() {
        return Ok(Vec::new());
    }

    let mut seen_siblings: HashSet<String> = HashSet::new();
    let mut usable_cores: Vec<usize> = Vec::new();

    let mut cpu_numbers: Vec<usize> = fs::read_dir(cpu_base)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            name_str.strip_prefix("cpu")?.parse::<usize>().ok()
        })
        .collect();
    cpu_numbers.sort_unstable();

    for cpu_num in cpu_numbers {
        // Skip core 0 - reserved for system
        if cpu_num == 0 {
            continue;
        }

        let siblings_path = cpu_base.join(format!("cpu{}/topology/thread_siblings_list", cpu_num));
        let siblings = match fs::read_to_string(&siblings_path) {
            Ok(s) => s.trim().to_string(),
            Err(_) => continue,
        };

        if seen_siblings.insert(siblings) {
            usable_cores.push(cpu_num);
        }
    }

    Ok(usable_cores)
}

/// Get the total number of logical CPUs available.
pub fn get_cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

/// Core for the `index`-th worker, assigned round-robin.
pub fn core_for_worker(cores: &[usize], index: usize) -> Option<usize> {
    if cores.is_empty() {
        None
    } else {
        Some(cores[index % cores.len()])
    }
}

/// Pin the calling thread to `core`. Failures are logged, never fatal.
pub fn pin_current_thread(core: usize) -> bool {
    match affinity::set_thread_affinity([core]) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(core, error = %e, "could not pin worker thread, running unpinned");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_usable_cores_not_empty() {
        let cores = get_usable_cores();
        assert!(!cores.is_empty(), "Should return at least one core");
    }

    #[test]
    fn test_get_usable_cores_excludes_zero_when_possible() {
        if get_cpu_count() > 1 {
            let cores = get_usable_cores();
            assert!(
                !cores.contains(&0),
                "Should not include core 0 (reserved for system)"
            );
        }
    }

    #[test]
    fn test_get_usable_cores_sorted() {
        let cores = get_usable_cores();
        let mut sorted = cores.clone();
        sorted.sort();
        assert_eq!(cores, sorted, "Cores should be in sorted order");
    }

    #[test]
    fn test_fallback_cores() {
        assert_eq!(fallback_cores(1), vec![0]);
        assert_eq!(fallback_cores(4), vec![1, 2, 3]);
    }

    #[test]
    fn test_core_for_worker_round_robin() {
        let cores = [2, 4, 6];
        assert_eq!(core_for_worker(&cores, 0), Some(2));
        assert_eq!(core_for_worker(&cores, 4), Some(4));
        assert_eq!(core_for_worker(&[], 1), None);
    }
}
