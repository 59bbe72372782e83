use std::collections::{HashMap, HashSet, hash_map::Entry};

use marquee_model::{Episode, Season, Title};

use crate::catalog::row::{FlatRow, GroupedRow, SeasonRecord};

/// Collapses the fan-out of the title join queries back into one aggregate
/// per title.
///
/// Titles live in an arena in first-encounter order, addressed through an
/// id → index map; a title is created on the first row carrying its id and
/// looked up afterwards, never recreated. Scalar fields are first-writer
/// wins. Membership of every association list is tracked in per-title
/// seen-sets, so each tag, episode and season id appears at most once per
/// title no matter how many joined rows produced it. Dedup scope is the
/// individual title: the same tag id under two different titles is
/// recorded under both.
///
/// The accumulator is fed in two phases over the same arena: the flat
/// query first (which fixes the canonical title order), then the season
/// query. A title seen only in the season phase is still created, making
/// the merge a full outer union on title identity.
#[derive(Debug, Default)]
pub struct TitleAccumulator {
    slots: Vec<Slot>,
    index: HashMap<i32, usize>,
}

#[derive(Debug)]
struct Slot {
    title: Title,
    seen: Associations,
}

#[derive(Debug, Default)]
struct Associations {
    genres: HashSet<i32>,
    categories: HashSet<i32>,
    age_ratings: HashSet<i32>,
    episodes: HashSet<i32>,
    seasons: HashMap<i32, SeasonSlot>,
}

/// Where a season landed in its title's list, plus the episode ids already
/// attached to it. Episode dedup for grouped children is scoped to the
/// season, not the title.
#[derive(Debug)]
struct SeasonSlot {
    position: usize,
    episodes: HashSet<i32>,
}

impl TitleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// One row of the flat-children query.
    pub fn push_flat(&mut self, row: FlatRow) {
        let idx = self.intern(row.title);
        let Slot { title, seen } = &mut self.slots[idx];

        if seen.genres.insert(row.genre.id) {
            title.genres.push(row.genre);
        }
        if seen.categories.insert(row.category.id) {
            title.categories.push(row.category);
        }
        if seen.age_ratings.insert(row.age_rating.id) {
            title.age_ratings.push(row.age_rating);
        }
        if let Some(episode) = row.episode
            && seen.episodes.insert(episode.id)
        {
            title.episodes.push(episode);
        }
    }

    /// One row of the season query. Runs as the second phase over the same
    /// arena the flat phase populated.
    pub fn push_grouped(&mut self, row: GroupedRow) {
        let idx = self.intern(row.title);
        let Slot { title, seen } = &mut self.slots[idx];

        let season_id = row.season.id;
        let season = row.season;
        let slot = seen.seasons.entry(season_id).or_insert_with(|| {
            let position = title.seasons.len();
            title.seasons.push(season.into_season());
            SeasonSlot {
                position,
                episodes: HashSet::new(),
            }
        });

        if let Some(episode) = row.episode
            && slot.episodes.insert(episode.id)
        {
            title.seasons[slot.position].episodes.push(episode);
        }
    }

    /// The finished aggregates, in first-encounter order of the flat
    /// phase, followed by titles only the season phase produced.
    pub fn finish(self) -> Vec<Title> {
        self.slots.into_iter().map(|slot| slot.title).collect()
    }

    /// Create-or-lookup by title id; later rows never overwrite the
    /// scalars captured from the first row.
    fn intern(&mut self, scalars: crate::catalog::row::TitleScalars) -> usize {
        match self.index.entry(scalars.id) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let idx = self.slots.len();
                entry.insert(idx);
                self.slots.push(Slot {
                    title: scalars.into_title(),
                    seen: Associations::default(),
                });
                idx
            }
        }
    }
}

/// Same arena + seen-set pattern for the season-rooted listing, where the
/// season itself is the root entity and episodes are its only children.
#[derive(Debug, Default)]
pub struct SeasonAccumulator {
    slots: Vec<(Season, HashSet<i32>)>,
    index: HashMap<i32, usize>,
}

impl SeasonAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push(&mut self, record: SeasonRecord, episode: Option<Episode>) {
        let idx = match self.index.entry(record.id) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let idx = self.slots.len();
                entry.insert(idx);
                self.slots.push((record.into_season(), HashSet::new()));
                idx
            }
        };

        let (season, seen) = &mut self.slots[idx];
        if let Some(episode) = episode
            && seen.insert(episode.id)
        {
            season.episodes.push(episode);
        }
    }

    pub fn finish(self) -> Vec<Season> {
        self.slots.into_iter().map(|(season, _)| season).collect()
    }
}

#[cfg(test)]
mod tests {
    use marquee_model::Tag;

    use super::*;
    use crate::catalog::row::TitleScalars;

    fn scalars(id: i32, name: &str) -> TitleScalars {
        TitleScalars {
            id,
            title: name.to_string(),
            description: format!("about {}", name),
            release_year: 2020,
            director: "Director".to_string(),
            producer: None,
            rating: 7,
            is_favourite: false,
            trailer_url: format!("https://youtu.be/abcdefghk{:02}", id),
            poster_url: "/posters/p.jpg".to_string(),
            trailer_views: None,
            duration: None,
            video_url: None,
            view_count: Some(0),
            screen_url: None,
        }
    }

    fn tag(id: i32, label: &str) -> Tag {
        Tag {
            id,
            label: label.to_string(),
            poster_url: None,
        }
    }

    fn episode(id: i32) -> Episode {
        Episode {
            id,
            number: Some(id),
            title: Some(format!("Episode {}", id)),
            trailer_url: None,
            duration: None,
            poster_url: None,
        }
    }

    fn season_record(id: i32, number: i32) -> SeasonRecord {
        SeasonRecord {
            id,
            number,
            title: format!("Season {}", number),
        }
    }

    fn flat_row(
        title: TitleScalars,
        genre: Tag,
        category: Tag,
        age_rating: Tag,
        episode: Option<Episode>,
    ) -> FlatRow {
        FlatRow {
            title,
            genre,
            category,
            age_rating,
            episode,
        }
    }

    /// 2 genres x 1 category x 3 age ratings x 2 episodes, truncated by
    /// left-join semantics into 6 raw rows, must collapse to exactly
    /// 2/1/3/2 entries.
    #[test]
    fn test_fan_out_collapses_to_distinct_associations() {
        let rows = vec![
            flat_row(scalars(1, "A"), tag(10, "drama"), tag(20, "film"), tag(30, "6+"), Some(episode(100))),
            flat_row(scalars(1, "A"), tag(11, "crime"), tag(20, "film"), tag(30, "6+"), Some(episode(100))),
            flat_row(scalars(1, "A"), tag(10, "drama"), tag(20, "film"), tag(31, "12+"), Some(episode(101))),
            flat_row(scalars(1, "A"), tag(11, "crime"), tag(20, "film"), tag(31, "12+"), Some(episode(101))),
            flat_row(scalars(1, "A"), tag(10, "drama"), tag(20, "film"), tag(32, "18+"), Some(episode(100))),
            flat_row(scalars(1, "A"), tag(11, "crime"), tag(20, "film"), tag(32, "18+"), Some(episode(101))),
        ];

        let mut acc = TitleAccumulator::new();
        for row in rows {
            acc.push_flat(row);
        }

        let titles = acc.finish();
        assert_eq!(titles.len(), 1);

        let title = &titles[0];
        assert_eq!(title.genres.len(), 2);
        assert_eq!(title.categories.len(), 1);
        assert_eq!(title.age_ratings.len(), 3);
        assert_eq!(title.episodes.len(), 2);

        // First-encounter order, not row order.
        let genre_ids: Vec<i32> = title.genres.iter().map(|g| g.id).collect();
        assert_eq!(genre_ids, vec![10, 11]);
        let age_ids: Vec<i32> =
            title.age_ratings.iter().map(|a| a.id).collect();
        assert_eq!(age_ids, vec![30, 31, 32]);
    }

    #[test]
    fn test_first_row_wins_for_scalars() {
        let mut acc = TitleAccumulator::new();
        acc.push_flat(flat_row(
            scalars(1, "first"),
            tag(10, "g"),
            tag(20, "c"),
            tag(30, "a"),
            None,
        ));

        let mut conflicting = scalars(1, "second");
        conflicting.rating = 99;
        acc.push_flat(flat_row(
            conflicting,
            tag(11, "g2"),
            tag(20, "c"),
            tag(30, "a"),
            None,
        ));

        let titles = acc.finish();
        assert_eq!(titles[0].title, "first");
        assert_eq!(titles[0].rating, 7);
        // The later row still contributed its new association.
        assert_eq!(titles[0].genres.len(), 2);
    }

    #[test]
    fn test_absent_outer_joined_episode_contributes_nothing() {
        let mut acc = TitleAccumulator::new();
        acc.push_flat(flat_row(
            scalars(1, "A"),
            tag(10, "g"),
            tag(20, "c"),
            tag(30, "a"),
            None,
        ));

        let titles = acc.finish();
        assert!(titles[0].episodes.is_empty());
    }

    #[test]
    fn test_episode_id_zero_is_a_real_episode() {
        let mut acc = TitleAccumulator::new();
        acc.push_flat(flat_row(
            scalars(1, "A"),
            tag(10, "g"),
            tag(20, "c"),
            tag(30, "a"),
            Some(episode(0)),
        ));

        let titles = acc.finish();
        assert_eq!(titles[0].episodes.len(), 1);
        assert_eq!(titles[0].episodes[0].id, 0);
    }

    #[test]
    fn test_dedup_scope_is_per_title() {
        let mut acc = TitleAccumulator::new();
        acc.push_flat(flat_row(
            scalars(1, "A"),
            tag(10, "drama"),
            tag(20, "c"),
            tag(30, "a"),
            None,
        ));
        acc.push_flat(flat_row(
            scalars(2, "B"),
            tag(10, "drama"),
            tag(20, "c"),
            tag(30, "a"),
            None,
        ));

        let titles = acc.finish();
        assert_eq!(titles.len(), 2);
        // The same genre id appears under both titles.
        assert_eq!(titles[0].genres[0].id, 10);
        assert_eq!(titles[1].genres[0].id, 10);
    }

    #[test]
    fn test_titles_keep_flat_query_encounter_order() {
        let mut acc = TitleAccumulator::new();
        for id in [5, 2, 9, 2, 5] {
            acc.push_flat(flat_row(
                scalars(id, "t"),
                tag(10, "g"),
                tag(20, "c"),
                tag(30, "a"),
                None,
            ));
        }

        let ids: Vec<i32> = acc.finish().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }

    #[test]
    fn test_grouped_phase_attaches_seasons_with_dedup() {
        let mut acc = TitleAccumulator::new();
        acc.push_flat(flat_row(
            scalars(1, "A"),
            tag(10, "g"),
            tag(20, "c"),
            tag(30, "a"),
            None,
        ));

        acc.push_grouped(GroupedRow {
            title: scalars(1, "A"),
            season: season_record(7, 1),
            episode: Some(episode(100)),
        });
        acc.push_grouped(GroupedRow {
            title: scalars(1, "A"),
            season: season_record(7, 1),
            episode: Some(episode(100)),
        });
        acc.push_grouped(GroupedRow {
            title: scalars(1, "A"),
            season: season_record(7, 1),
            episode: Some(episode(101)),
        });
        acc.push_grouped(GroupedRow {
            title: scalars(1, "A"),
            season: season_record(8, 2),
            episode: Some(episode(100)),
        });

        let titles = acc.finish();
        let seasons = &titles[0].seasons;
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[0].episodes.len(), 2);
        // Episode dedup is per season: id 100 may appear under season 8
        // even though season 7 already carries it.
        assert_eq!(seasons[1].episodes.len(), 1);
        assert_eq!(seasons[1].episodes[0].id, 100);
    }

    /// A title that has seasons but no flat episodes (and so never shows
    /// up in the flat query result) must still be represented: full outer
    /// union on title identity, appended after the flat-phase titles.
    #[test]
    fn test_grouped_only_title_is_created() {
        let mut acc = TitleAccumulator::new();
        acc.push_flat(flat_row(
            scalars(1, "A"),
            tag(10, "g"),
            tag(20, "c"),
            tag(30, "a"),
            None,
        ));
        acc.push_grouped(GroupedRow {
            title: scalars(2, "B"),
            season: season_record(7, 1),
            episode: None,
        });

        let titles = acc.finish();
        assert_eq!(titles.len(), 2);

        let grouped_only = &titles[1];
        assert_eq!(grouped_only.id, 2);
        assert!(grouped_only.episodes.is_empty());
        assert_eq!(grouped_only.seasons.len(), 1);
        // Outer-joined away: the season keeps an empty episode list
        // rather than being dropped.
        assert!(grouped_only.seasons[0].episodes.is_empty());
    }

    #[test]
    fn test_rebuild_is_structurally_idempotent() {
        let rows = vec![
            flat_row(scalars(1, "A"), tag(10, "g"), tag(20, "c"), tag(30, "a"), Some(episode(100))),
            flat_row(scalars(2, "B"), tag(11, "g2"), tag(20, "c"), tag(31, "a2"), None),
            flat_row(scalars(1, "A"), tag(11, "g2"), tag(20, "c"), tag(30, "a"), Some(episode(101))),
        ];
        let grouped = GroupedRow {
            title: scalars(1, "A"),
            season: season_record(7, 1),
            episode: Some(episode(200)),
        };

        let build = || {
            let mut acc = TitleAccumulator::new();
            for row in rows.clone() {
                acc.push_flat(row);
            }
            acc.push_grouped(grouped.clone());
            acc.finish()
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn test_season_accumulator_dedups_and_keeps_order() {
        let mut acc = SeasonAccumulator::new();
        acc.push(season_record(2, 2), Some(episode(100)));
        acc.push(season_record(1, 1), Some(episode(101)));
        acc.push(season_record(2, 2), Some(episode(100)));
        acc.push(season_record(2, 2), Some(episode(102)));
        acc.push(season_record(3, 3), None);

        let seasons = acc.finish();
        let ids: Vec<i32> = seasons.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(seasons[0].episodes.len(), 2);
        assert_eq!(seasons[1].episodes.len(), 1);
        assert!(seasons[2].episodes.is_empty());
    }
}
