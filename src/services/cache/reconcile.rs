use std::collections::BTreeMap;

use super::model::Cache;
use crate::model::block::Block;

/// Splits `fresh` into the blocks still needing translation and a cache
/// without the entries whose source text is gone.
pub fn reconcile(fresh: &[Block], cache: &Cache) -> (Vec<Block>, Cache) {
    let mut consumed = vec![false; cache.main.len()];
    let mut worklist = Vec::new();

    for block in fresh {
        let hit = cache
            .main
            .iter()
            .enumerate()
            .position(|(i, cached)| !consumed[i] && cached.same_as(block));

        match hit {
            Some(i) => consumed[i] = true,
            None => worklist.push(block.clone()),
        }
    }

    let pruned = Cache {
        main: keep_consumed(&cache.main, &consumed),
        languages: cache
            .languages
            .iter()
            .map(|(lang, blocks)| (lang.clone(), keep_consumed(blocks, &consumed)))
            .collect(),
        source_lang: cache.source_lang.clone(),
    };

    (worklist, pruned)
}

fn keep_consumed(blocks: &[Block], consumed: &[bool]) -> Vec<Block> {
    blocks
        .iter()
        .zip(consumed)
        .filter(|(_, keep)| **keep)
        .map(|(block, _)| block.clone())
        .collect()
}

/// Appends this run's blocks after what pruning left.
///
/// `translated` holds, per target language, the translations of the
/// language's backlog (see [`backlog`]) followed by the worklist. Languages
/// absent from `translated` are dropped.
pub fn merge(
    cache: &Cache,
    worklist: &[Block],
    translated: BTreeMap<String, Vec<Block>>,
    source_lang: &str,
) -> Cache {
    let mut main = cache.main.clone();
    main.extend_from_slice(worklist);

    let languages = translated
        .into_iter()
        .map(|(lang, blocks)| {
            let mut merged = if cache.is_aligned(&lang) {
                cache.language(&lang).to_vec()
            } else {
                Vec::new()
            };
            merged.extend(blocks);
            (lang, merged)
        })
        .collect();

    Cache {
        main,
        languages,
        source_lang: Some(source_lang.to_string()),
    }
}

/// Main entries `lang` must have translated before the worklist so that it
/// lines up with the main list: nothing when aligned, everything otherwise.
pub fn backlog<'a>(cache: &'a Cache, lang: &str) -> &'a [Block] {
    if cache.is_aligned(lang) {
        &[]
    } else {
        &cache.main
    }
}
