//! Decides the order in which the ports of a range are probed.
//!
//! The order only affects which probes are in flight together. The scan
//! report is always ascending.
mod range_iterator;
use crate::input::ScanOrder;
use crate::target::PortRange;
use range_iterator::RangeIterator;

/// Represents options of port scanning.
#[derive(Debug, Clone, Copy)]
pub enum PortStrategy {
    Serial(PortRange),
    Random(PortRange),
}

impl PortStrategy {
    pub const fn pick(range: PortRange, order: ScanOrder) -> Self {
        match order {
            ScanOrder::Serial => Self::Serial(range),
            ScanOrder::Random => Self::Random(range),
        }
    }

    pub const fn range(&self) -> PortRange {
        match self {
            Self::Serial(range) | Self::Random(range) => *range,
        }
    }

    pub fn order(&self) -> Box<dyn Iterator<Item = u16> + Send> {
        match *self {
            Self::Serial(range) => Box::new(range.iter()),
            Self::Random(range) => Box::new(RangeIterator::new(range)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PortStrategy;
    use crate::input::ScanOrder;
    use crate::target::PortRange;

    #[test]
    fn serial_strategy_is_ascending() {
        let range = PortRange::new(1, 100).unwrap();
        let strategy = PortStrategy::pick(range, ScanOrder::Serial);
        let result = strategy.order().collect::<Vec<_>>();

        assert_eq!(result, (1..=100).collect::<Vec<u16>>());
    }

    #[test]
    fn random_strategy_covers_range() {
        let range = PortRange::new(1, 1000).unwrap();
        let strategy = PortStrategy::pick(range, ScanOrder::Random);
        let mut result = strategy.order().collect::<Vec<_>>();
        let expected = (1..=1000).collect::<Vec<u16>>();

        assert_ne!(expected, result);
        result.sort_unstable();
        assert_eq!(expected, result);
    }

    #[test]
    fn single_port() {
        let range = PortRange::new(2000, 2000).unwrap();
        for order in [ScanOrder::Serial, ScanOrder::Random] {
            let strategy = PortStrategy::pick(range, order);
            assert_eq!(strategy.order().collect::<Vec<_>>(), vec![2000]);
            assert_eq!(strategy.range(), range);
        }
    }
}
