use crate::query::{JoinHop, OrderSpec, Predicate, Queryable};

///
/// Plan
///
/// Queryable calls staged while a request is being applied. Filters write
/// here first; the caller's queryable only sees the calls once every filter
/// has succeeded.
///

#[derive(Debug, Default)]
pub(crate) struct Plan {
    steps: Vec<Step>,
}

#[derive(Debug)]
enum Step {
    Filter(Predicate),
    Join(JoinHop),
    OrderBy(OrderSpec),
    Limit(u64),
    Offset(u64),
}

impl Plan {
    /// Replay the staged calls onto `query`, in the order they were made.
    pub(crate) fn replay<Q: Queryable>(self, query: &mut Q) {
        for step in self.steps {
            match step {
                Step::Filter(predicate) => query.filter(predicate),
                Step::Join(hop) => query.join(&hop),
                Step::OrderBy(order) => query.order_by(order),
                Step::Limit(limit) => query.limit(limit),
                Step::Offset(offset) => query.offset(offset),
            }
        }
    }
}

impl Queryable for Plan {
    fn filter(&mut self, predicate: Predicate) {
        self.steps.push(Step::Filter(predicate));
    }

    fn join(&mut self, hop: &JoinHop) {
        self.steps.push(Step::Join(*hop));
    }

    fn order_by(&mut self, order: OrderSpec) {
        self.steps.push(Step::OrderBy(order));
    }

    fn limit(&mut self, limit: u64) {
        self.steps.push(Step::Limit(limit));
    }

    fn offset(&mut self, offset: u64) {
        self.steps.push(Step::Offset(offset));
    }
}
