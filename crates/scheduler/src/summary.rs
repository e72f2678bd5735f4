// summary.rs
// Human-readable description of how a partition distributed its elements.

/// Groups chunk sizes by value, in first-seen order, and renders them as
/// `"3 chunks of 11 elements and 2 chunks of 10 elements"`.
pub fn describe_distribution<I>(sizes: I) -> String
where
    I: IntoIterator<Item = usize>,
{
    let groups = group_by_size(sizes);
    let phrases: Vec<String> = groups
        .into_iter()
        .map(|(size, count)| format!("{count} chunks of {size} elements"))
        .collect();
    oxford_join(&phrases)
}

/// Counts equal sizes while keeping the order in which each size first appears.
pub fn group_by_size<I>(sizes: I) -> Vec<(usize, usize)>
where
    I: IntoIterator<Item = usize>,
{
    let mut groups: Vec<(usize, usize)> = Vec::new();
    for size in sizes {
        match groups.iter_mut().find(|(s, _)| *s == size) {
            Some((_, count)) => *count += 1,
            None => groups.push((size, 1)),
        }
    }
    groups
}

/// Joins items with `", "`, using `" and "` before the last one.
pub fn oxford_join<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}
