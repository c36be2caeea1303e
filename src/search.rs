use crate::model::District;

/// Districts whose name or state contains `term`, ignoring case. Input order is kept and
/// an empty term matches every district.
pub fn search<'a>(districts: &'a [District], term: &str) -> Vec<&'a District> {
    let needle = term.trim().to_lowercase();
    districts
        .iter()
        .filter(|district| {
            needle.is_empty()
                || district.name.to_lowercase().contains(&needle)
                || district.state.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn find<'a>(districts: &'a [District], id: &str) -> Option<&'a District> {
    districts.iter().find(|district| district.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Centroid;

    fn district(id: &str, name: &str, state: &str) -> District {
        District {
            id: id.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            centroid: Centroid { lat: 0.0, lng: 0.0 },
        }
    }

    fn districts() -> Vec<District> {
        vec![
            district("MH-PUNE", "Pune", "Maharashtra"),
            district("MH-NGP", "Nagpur", "Maharashtra"),
            district("UP-LKO", "Lucknow", "Uttar Pradesh"),
        ]
    }

    #[test]
    fn matches_name_case_insensitively() {
        let districts = districts();
        let ids: Vec<&str> = search(&districts, "LUCK").iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["UP-LKO"]);
    }

    #[test]
    fn matches_state_in_input_order() {
        let districts = districts();
        let ids: Vec<&str> = search(&districts, "maharashtra")
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, ["MH-PUNE", "MH-NGP"]);
    }

    #[test]
    fn empty_term_matches_all() {
        let districts = districts();
        assert_eq!(search(&districts, "  ").len(), 3);
        assert!(search(&districts, "kerala").is_empty());
    }

    #[test]
    fn finds_by_id() {
        let districts = districts();
        assert_eq!(find(&districts, "MH-NGP").map(|d| d.name.as_str()), Some("Nagpur"));
        assert!(find(&districts, "mh-ngp").is_none());
    }
}
