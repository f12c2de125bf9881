// Wed Feb 4 2026 - Alex

use regex::Regex;

use crate::memory::{Region, RegionSet};

/// A borrowed sub-selection of a region set.
///
/// Views never outlive the set they were filtered from and hold regions
/// in set order. An empty selection is represented by returning no view
/// at all.
#[derive(Debug)]
pub struct RegionView<'a> {
    regions: Vec<&'a Region>,
}

impl<'a> RegionView<'a> {
    /// Build a view over an explicit selection of regions.
    pub fn from_regions(regions: Vec<&'a Region>) -> Option<Self> {
        if regions.is_empty() {
            None
        } else {
            Some(Self { regions })
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Region> + '_ {
        self.regions.iter().copied()
    }

    pub fn get(&self, index: usize) -> Option<&'a Region> {
        self.regions.get(index).copied()
    }
}

impl RegionSet {
    /// View over every region in the set.
    pub fn view(&self) -> Option<RegionView<'_>> {
        self.select(|_| true)
    }

    pub fn filter_pathname(&self, name: &str) -> Option<RegionView<'_>> {
        self.select(|r| r.pathname() == name)
    }

    pub fn filter_out_pathname(&self, name: &str) -> Option<RegionView<'_>> {
        self.select(|r| r.pathname() != name)
    }

    pub fn filter_basename(&self, name: &str) -> Option<RegionView<'_>> {
        self.select(|r| r.basename() == name)
    }

    pub fn filter_out_basename(&self, name: &str) -> Option<RegionView<'_>> {
        self.select(|r| r.basename() != name)
    }

    pub fn filter_regex(&self, regex: &Regex) -> Option<RegionView<'_>> {
        self.select(|r| regex.is_match(r.pathname()))
    }

    pub fn filter_out_regex(&self, regex: &Regex) -> Option<RegionView<'_>> {
        self.select(|r| !regex.is_match(r.pathname()))
    }

    fn select<F>(&self, keep: F) -> Option<RegionView<'_>>
    where
        F: Fn(&Region) -> bool,
    {
        let regions: Vec<&Region> = self.iter().filter(|r| keep(r)).collect();
        if regions.is_empty() {
            None
        } else {
            Some(RegionView { regions })
        }
    }
}
