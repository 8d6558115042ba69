use {
    crate::core::dfa::predicate::SemanticContext,
    std::{convert::TryFrom, fmt},
};

pub const EOF: i32 = -1;
/// Reserved value marking where lookahead input ran out along a path.
pub const EOT: i32 = -2;
pub const MIN_TOKEN_TYPE: i32 = 4;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Interval {
    pub lo: i32,
    pub hi: i32,
}

impl Interval {
    pub fn size(&self) -> usize {
        let size = i64::from(self.hi) - i64::from(self.lo) + 1;
        usize::try_from(size).unwrap_or(usize::max_value())
    }
}

/// Sorted, non-overlapping, non-adjacent inclusive intervals.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        IntervalSet {
            intervals: Vec::new(),
        }
    }

    pub fn of(value: i32) -> Self {
        let mut set = IntervalSet::new();
        set.add(value);
        set
    }

    pub fn range(lo: i32, hi: i32) -> Self {
        let mut set = IntervalSet::new();
        set.add_range(lo, hi);
        set
    }

    pub fn add(&mut self, value: i32) {
        self.add_range(value, value);
    }

    pub fn add_range(&mut self, lo: i32, hi: i32) {
        if lo > hi {
            return;
        }

        let mut merged = Interval { lo, hi };
        let mut res: Vec<Interval> = Vec::with_capacity(self.intervals.len() + 1);
        let mut placed = false;

        for interval in &self.intervals {
            if interval.hi.saturating_add(1) < merged.lo {
                res.push(*interval);
            } else if merged.hi.saturating_add(1) < interval.lo {
                if !placed {
                    res.push(merged);
                    placed = true;
                }
                res.push(*interval);
            } else {
                merged = Interval {
                    lo: merged.lo.min(interval.lo),
                    hi: merged.hi.max(interval.hi),
                };
            }
        }

        if !placed {
            res.push(merged);
        }

        self.intervals = res;
    }

    pub fn contains(&self, value: i32) -> bool {
        self.intervals
            .iter()
            .any(|interval| interval.lo <= value && value <= interval.hi)
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn size(&self) -> usize {
        self.intervals
            .iter()
            .fold(0, |size: usize, interval| size.saturating_add(interval.size()))
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn single_element(&self) -> Option<i32> {
        match self.intervals.as_slice() {
            [interval] if interval.lo == interval.hi => Some(interval.lo),
            _ => None,
        }
    }

    pub fn to_list(&self) -> Vec<i32> {
        self.intervals
            .iter()
            .flat_map(|interval| interval.lo..=interval.hi)
            .collect()
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self
            .intervals
            .iter()
            .map(|interval| {
                if interval.lo == interval.hi {
                    format!("{}", interval.lo)
                } else {
                    format!("{}..{}", interval.lo, interval.hi)
                }
            })
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum Label {
    Atom(i32),
    Set(IntervalSet),
    Predicate(SemanticContext),
    Eot,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LabelKind {
    Values,
    Predicate,
    Eot,
}

/// Classifies a transition label; every label falls in exactly one kind.
pub fn classify(label: &Label) -> LabelKind {
    match label {
        Label::Eot | Label::Atom(EOT) => LabelKind::Eot,
        Label::Predicate(_) => LabelKind::Predicate,
        Label::Atom(_) | Label::Set(_) => LabelKind::Values,
    }
}

impl Label {
    pub fn atom(value: i32) -> Self {
        if value == EOT {
            Label::Eot
        } else {
            Label::Atom(value)
        }
    }

    pub fn set(set: IntervalSet) -> Self {
        match set.single_element() {
            Some(value) => Label::atom(value),
            None => Label::Set(set),
        }
    }

    pub fn predicate(context: SemanticContext) -> Self {
        Label::Predicate(context)
    }

    pub fn kind(&self) -> LabelKind {
        classify(self)
    }

    pub fn is_semantic_predicate(&self) -> bool {
        self.kind() == LabelKind::Predicate
    }

    pub fn is_eot(&self) -> bool {
        self.kind() == LabelKind::Eot
    }

    /// The values matched by this label, if it matches input values at all.
    pub fn value_set(&self) -> Option<IntervalSet> {
        match self.kind() {
            LabelKind::Values => match self {
                Label::Atom(value) => Some(IntervalSet::of(*value)),
                Label::Set(set) => Some(set.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn semantic_context(&self) -> Option<&SemanticContext> {
        match self {
            Label::Predicate(context) => Some(context),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::Atom(EOT) | Label::Eot => write!(f, "<EOT>"),
            Label::Atom(value) => write!(f, "{}", value),
            Label::Set(set) => write!(f, "{}", set),
            Label::Predicate(context) => write!(f, "{{{}}}?", context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_each_kind() {
        //setup
        let atom = Label::Atom(5);
        let set = Label::Set(IntervalSet::range(4, 9));
        let pred = Label::Predicate(SemanticContext::predicate("p"));
        let eot = Label::Eot;
        let eot_atom = Label::Atom(EOT);

        //exercise/verify
        assert_eq!(classify(&atom), LabelKind::Values);
        assert_eq!(classify(&set), LabelKind::Values);
        assert_eq!(classify(&pred), LabelKind::Predicate);
        assert_eq!(classify(&eot), LabelKind::Eot);
        assert_eq!(classify(&eot_atom), LabelKind::Eot);
    }

    #[test]
    fn atom_constructor_normalizes_eot() {
        //exercise/verify
        assert_eq!(Label::atom(EOT), Label::Eot);
        assert_eq!(Label::atom(EOF), Label::Atom(EOF));
    }

    #[test]
    fn singleton_set_becomes_atom() {
        //exercise/verify
        assert_eq!(Label::set(IntervalSet::of(7)), Label::Atom(7));
        assert_eq!(
            Label::set(IntervalSet::range(7, 8)),
            Label::Set(IntervalSet::range(7, 8))
        );
    }

    #[test]
    fn add_range_merges_adjacent_and_overlapping() {
        //setup
        let mut set = IntervalSet::new();

        //exercise
        set.add(10);
        set.add_range(4, 6);
        set.add(7);
        set.add_range(20, 25);
        set.add_range(9, 11);

        //verify
        assert_eq!(
            set.intervals(),
            &[
                Interval { lo: 4, hi: 7 },
                Interval { lo: 9, hi: 11 },
                Interval { lo: 20, hi: 25 },
            ]
        );
        assert_eq!(set.size(), 13);
        assert!(set.contains(22));
        assert!(!set.contains(8));
    }

    #[test]
    fn size_of_full_value_range() {
        //setup
        let set = IntervalSet::range(i32::min_value(), i32::max_value());

        //exercise
        let res = set.size();

        //verify
        assert_eq!(res as u64, 1u64 << 32);
        assert_eq!(Interval { lo: -5, hi: 5 }.size(), 11);
    }

    #[test]
    fn add_range_bridges_intervals() {
        //setup
        let mut set = IntervalSet::range(1, 2);
        set.add_range(6, 7);

        //exercise
        set.add_range(3, 5);

        //verify
        assert_eq!(set.intervals(), &[Interval { lo: 1, hi: 7 }]);
    }

    #[test]
    fn to_list_enumerates_in_order() {
        //setup
        let mut set = IntervalSet::range(8, 10);
        set.add(EOF);

        //exercise
        let res = set.to_list();

        //verify
        assert_eq!(res, vec![EOF, 8, 9, 10]);
    }

    #[test]
    fn value_set_only_for_values() {
        //exercise/verify
        assert_eq!(Label::Atom(4).value_set(), Some(IntervalSet::of(4)));
        assert_eq!(Label::Eot.value_set(), None);
        assert_eq!(
            Label::Predicate(SemanticContext::predicate("p")).value_set(),
            None
        );
    }

    #[test]
    fn label_display() {
        //exercise/verify
        assert_eq!(Label::Atom(4).to_string(), "4");
        assert_eq!(Label::Eot.to_string(), "<EOT>");
        let mut set = IntervalSet::range(4, 6);
        set.add(9);
        assert_eq!(Label::Set(set).to_string(), "{4..6, 9}");
        assert_eq!(
            Label::Predicate(SemanticContext::predicate("p")).to_string(),
            "{p}?"
        );
    }
}
