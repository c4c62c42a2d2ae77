use crate::error::{CoreError, Result};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use tracing::warn;

/// Parse a Kubernetes CPU quantity string (e.g., "2", "0.5", "1500m") into
/// milli-cores (1000 = 1 core).
///
/// All scheduler arithmetic is done in integer milli-cores so that fractional
/// quantities compare exactly.
pub fn parse_cpu(s: &str) -> Result<i64> {
    let milli = if let Some(m) = s.strip_suffix('m') {
        m.parse::<i64>()
            .map_err(|_| CoreError::malformed_quantity(s))?
    } else if let Ok(cores) = s.parse::<f64>() {
        if !cores.is_finite() {
            return Err(CoreError::malformed_quantity(s));
        }
        (cores * 1000.0) as i64
    } else {
        return Err(CoreError::malformed_quantity(s));
    };

    if milli < 0 {
        return Err(CoreError::malformed_quantity(s));
    }

    Ok(milli)
}

/// Summed CPU limits and requests across all containers of one pod, in
/// milli-cores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTotals {
    /// Sum of declared CPU limits
    pub limit_milli: i64,
    /// Sum of declared CPU requests
    pub request_milli: i64,
}

/// Sum the CPU limits and requests declared by a pod's containers.
///
/// A container with no resources, or no CPU entry, contributes 0 — absence is
/// a valid state (best-effort containers). A value that is present but
/// unparsable also contributes 0 and is logged, never treated as fatal.
pub fn pod_cpu_totals(pod: &Pod) -> CpuTotals {
    let mut totals = CpuTotals::default();

    let spec = match &pod.spec {
        Some(spec) => spec,
        None => return totals,
    };

    for container in &spec.containers {
        if let Some(resources) = &container.resources {
            if let Some(limits) = &resources.limits {
                totals.limit_milli += cpu_milli_or_zero(limits.get("cpu"));
            }
            if let Some(requests) = &resources.requests {
                totals.request_milli += cpu_milli_or_zero(requests.get("cpu"));
            }
        }
    }

    totals
}

fn cpu_milli_or_zero(quantity: Option<&Quantity>) -> i64 {
    match quantity {
        Some(q) => match parse_cpu(&q.0) {
            Ok(milli) => milli,
            Err(e) => {
                warn!("Treating unparsable CPU quantity as 0: {}", e);
                0
            }
        },
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn quantity(s: &str) -> Quantity {
        Quantity(s.to_string())
    }

    fn pod_with_containers(resources: &[(Option<&str>, Option<&str>)]) -> Pod {
        let mut pod = Pod::default();
        pod.spec = Some(Default::default());
        let containers = &mut pod.spec.as_mut().unwrap().containers;

        for (limit, request) in resources {
            let mut container = k8s_openapi::api::core::v1::Container::default();
            container.name = "test".to_string();
            container.resources = Some(Default::default());

            if let Some(limit) = limit {
                let mut limits = BTreeMap::new();
                limits.insert("cpu".to_string(), quantity(limit));
                container.resources.as_mut().unwrap().limits = Some(limits);
            }
            if let Some(request) = request {
                let mut requests = BTreeMap::new();
                requests.insert("cpu".to_string(), quantity(request));
                container.resources.as_mut().unwrap().requests = Some(requests);
            }

            containers.push(container);
        }

        pod
    }

    #[test]
    fn test_parse_cpu() {
        assert_eq!(parse_cpu("1").unwrap(), 1000);
        assert_eq!(parse_cpu("0.5").unwrap(), 500);
        assert_eq!(parse_cpu("100m").unwrap(), 100);
        assert_eq!(parse_cpu("2").unwrap(), 2000);
        assert_eq!(parse_cpu("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_cpu_rejects_garbage() {
        assert!(parse_cpu("two").is_err());
        assert!(parse_cpu("12parsecs").is_err());
        assert!(parse_cpu("-100m").is_err());
        assert!(parse_cpu("-1").is_err());
        assert!(parse_cpu("inf").is_err());
    }

    #[test]
    fn test_pod_cpu_totals_sums_containers() {
        let pod = pod_with_containers(&[
            (Some("500m"), Some("250m")),
            (Some("1"), Some("0.5")),
        ]);

        let totals = pod_cpu_totals(&pod);
        assert_eq!(totals.limit_milli, 1500);
        assert_eq!(totals.request_milli, 750);
    }

    #[test]
    fn test_pod_cpu_totals_missing_values_are_zero() {
        // One container with only a limit, one with nothing declared
        let pod = pod_with_containers(&[(Some("2"), None), (None, None)]);

        let totals = pod_cpu_totals(&pod);
        assert_eq!(totals.limit_milli, 2000);
        assert_eq!(totals.request_milli, 0);
    }

    #[test]
    fn test_pod_cpu_totals_no_spec() {
        let pod = Pod::default();
        assert_eq!(pod_cpu_totals(&pod), CpuTotals::default());
    }

    #[test]
    fn test_pod_cpu_totals_malformed_contributes_zero() {
        let pod = pod_with_containers(&[(Some("bogus"), Some("250m"))]);

        let totals = pod_cpu_totals(&pod);
        assert_eq!(totals.limit_milli, 0);
        assert_eq!(totals.request_milli, 250);
    }
}
