//! Pure charger selection helpers

use emporia_domain::EvCharger;

/// Charger at `index`, `None` when out of range
pub fn by_index(chargers: &[EvCharger], index: usize) -> Option<&EvCharger> {
    chargers.get(index)
}

/// Charger with the given device gid
pub fn by_id(chargers: &[EvCharger], device_gid: u64) -> Option<&EvCharger> {
    chargers.iter().find(|c| c.device_gid == device_gid)
}

/// Device gids in API order
pub fn ids(chargers: &[EvCharger]) -> Vec<u64> {
    chargers.iter().map(|c| c.device_gid).collect()
}

/// Body to send to switch `charger` to `on`, `None` when it already is.
///
/// The whole charger object is sent back so fields this client does not
/// model are preserved.
pub fn plan_toggle(charger: &EvCharger, on: bool) -> Option<EvCharger> {
    if charger.charger_on == on {
        return None;
    }
    let mut updated = charger.clone();
    updated.charger_on = on;
    Some(updated)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn chargers() -> Vec<EvCharger> {
        vec![EvCharger::new(11, false), EvCharger::new(22, true)]
    }

    #[test]
    fn test_index_lookup() {
        let chargers = chargers();
        assert_eq!(by_index(&chargers, 1).map(|c| c.device_gid), Some(22));
        assert!(by_index(&chargers, 2).is_none());
        assert!(by_index(&[], 0).is_none());
    }

    #[test]
    fn test_id_lookup_and_ids() {
        let chargers = chargers();
        assert_eq!(by_id(&chargers, 11).map(|c| c.charger_on), Some(false));
        assert!(by_id(&chargers, 33).is_none());
        assert_eq!(ids(&chargers), vec![11, 22]);
    }

    #[test]
    fn test_plan_toggle_skips_matching_state() {
        let charger = EvCharger::new(11, true);
        assert!(plan_toggle(&charger, true).is_none());
    }

    #[test]
    fn test_plan_toggle_keeps_unmodelled_fields() {
        let charger: EvCharger = serde_json::from_value(json!({
            "deviceGid": 11,
            "chargerOn": false,
            "chargingRate": 16,
            "loadGid": 7
        }))
        .unwrap();

        let updated = plan_toggle(&charger, true).unwrap();
        assert!(updated.charger_on);
        assert_eq!(updated.charging_rate, Some(16));
        assert_eq!(updated.extra["loadGid"], 7);
    }
}
