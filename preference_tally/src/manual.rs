/*!

This is the long-form manual for `preference_tally` and `pbtally`.

## Input format

The input is a plain text file. The first line carries three integers:

```text
V P G
```

where `V` is the number of voters, `P` the number of projects on the slate
and `G` the number of voter groups to build. It is followed by exactly `V`
ballot lines:

```text
CF01 Park > Library = Pool
```

A ballot line starts with the voter identifier, then lists all `P` project
names from the most preferred to the least preferred, separated by relation
tokens. `>` marks a strict preference, `=` marks a tie between the adjacent
projects. Every ballot must rank the full slate exactly once.

The project slate is recovered from the first ballot line and sorted
alphabetically; the order in which a ballot lists the projects carries the
preference, not their position on the slate.

## Methods

Three aggregation methods are computed on every run:

* **Plurality system**: each voter contributes one vote to every project of
  their leading tie-group. Projects are ranked by vote count, descending.
* **Borda count**: the best rank of a `P`-project ballot is worth `P` points,
  the next `P - 1`, and so on. A tie-group shares the points of its best
  rank; the budget then drops by the size of the group. Projects are ranked
  by total points, descending.
* **Condorcet method**: every pair of projects is compared by the number of
  ballots preferring one to the other. The duels form a directed graph
  (with edges both ways on a tied duel) and projects are ranked by the
  strongly connected components of that graph. A component of two or more
  projects is a preference cycle and is reported as a single tie-group,
  without a score.

Within equal scores, projects are listed in alphabetical order.

## Voter groups

Voters are also partitioned into `G` groups of similar preferences. The
distance between two voters is the Manhattan distance between their Borda
score rows. Representatives are picked greedily, one at a time, each
minimizing the total distance of the electorate to its closest
representative; every tie breaks toward the lexicographically smaller voter
identifier. Fewer than `G` groups can come out when every voter already
matches a representative profile exactly.

## Output

Results are printed as text, one section per method and one for the groups.
With `--out`, a JSON summary is also written; with `--reference`, the text
output is compared against a reference file and the run fails on any
difference.

*/
