//! Low-cardinality route names for spans and metric labels.

use uuid::Uuid;

/// Replace UUID path segments with `{id}`, so
/// `/api/v1/order/drivers/<uuid>/stats` becomes
/// `/api/v1/order/drivers/{id}/stats`.
pub(super) fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}
