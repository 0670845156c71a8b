use rand::RngCore;

pub struct AcceptSolutionContext<'a, R>
where
    R: RngCore,
{
    /// 1-based.
    pub iteration: usize,
    pub max_iterations: usize,
    pub rng: &'a mut R,
}

/// Decides whether a new solution replaces the current one in the search.
/// Scores are minimized.
pub trait AcceptSolution {
    fn accept<R>(&self, current_score: f64, new_score: f64, context: AcceptSolutionContext<R>) -> bool
    where
        R: RngCore;
}
