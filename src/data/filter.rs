use super::model::{Continent, Dataset};

/// Rows observed in exactly `year`. An absent year yields an empty dataset.
pub fn filter_by_year(dataset: &Dataset, year: i32) -> Dataset {
    Dataset::from_subset(
        dataset
            .records()
            .iter()
            .filter(|r| r.year == year)
            .cloned()
            .collect(),
    )
}

/// Rows belonging to one continent.
pub fn filter_by_continent(dataset: &Dataset, continent: Continent) -> Dataset {
    Dataset::from_subset(
        dataset
            .records()
            .iter()
            .filter(|r| r.continent == continent)
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_dataset;

    #[test]
    fn keeps_only_matching_year() {
        let ds = sample_dataset();
        let latest = filter_by_year(&ds, 2007);
        assert_eq!(latest.len(), 4);
        assert!(latest.records().iter().all(|r| r.year == 2007));
    }

    #[test]
    fn absent_year_is_empty_not_an_error() {
        let ds = sample_dataset();
        assert!(filter_by_year(&ds, 1800).is_empty());
        assert!(filter_by_year(&Dataset::default(), 2007).is_empty());
    }

    #[test]
    fn preserves_input_order() {
        let ds = sample_dataset();
        let africa = filter_by_continent(&ds, Continent::Africa);
        let countries: Vec<&str> = africa.records().iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, vec!["Kenya", "Chad", "Kenya", "Chad"]);
    }
}
