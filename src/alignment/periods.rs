use serde::{Deserialize, Serialize};

/// Calendar and exogenous block of one simulated period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub period: usize,
    /// Exogenous change block driving this period
    pub block: usize,
    /// Years covered by this period; 0 for the base period
    pub length: u32,
    pub year: i32,
}

/// Period schedule derived from the declared exogenous period blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTable {
    periods: Vec<PeriodInfo>,
}

impl PeriodTable {
    /// `declared` holds (period number, forecast years) sorted by period number.
    ///
    /// The last declared block keeps driving every period beyond it.
    pub fn build(declared: &[(u32, u32)], base_year: i32, max_period: usize) -> Self {
        let mut periods = Vec::with_capacity(max_period + 1);
        periods.push(PeriodInfo { period: 0, block: 0, length: 0, year: base_year });

        let mut row = 0usize;
        let mut year = base_year;
        for period in 1..=max_period {
            let block = row;
            if let Some(&(next, _)) = declared.get(row + 1) {
                if next as usize == period + 1 {
                    row += 1;
                }
            }
            let length = declared.get(block).map(|&(_, years)| years).unwrap_or(0);
            year += length as i32;
            periods.push(PeriodInfo { period, block, length, year });
        }
        Self { periods }
    }

    pub fn get(&self, period: usize) -> Option<&PeriodInfo> {
        self.periods.get(period)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeriodInfo> {
        self.periods.iter()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_blocks_advance_per_period() {
        let table = PeriodTable::build(&[(1, 5), (2, 5), (3, 10)], 2020, 3);
        let years: Vec<i32> = table.iter().map(|p| p.year).collect();
        let blocks: Vec<usize> = table.iter().map(|p| p.block).collect();
        assert_eq!(years, vec![2020, 2025, 2030, 2040]);
        assert_eq!(blocks, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_last_block_repeats() {
        let table = PeriodTable::build(&[(1, 5)], 2020, 3);
        assert!(table.iter().skip(1).all(|p| p.block == 0 && p.length == 5), "Single block should drive all periods");
        assert_eq!(table.get(3).map(|p| p.year), Some(2035));
    }

    #[test]
    fn test_base_period_has_zero_length() {
        let table = PeriodTable::build(&[], 2017, 0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0), Some(&PeriodInfo { period: 0, block: 0, length: 0, year: 2017 }));
    }
}
