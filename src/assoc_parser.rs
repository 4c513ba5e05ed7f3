use std::collections::HashMap;

use winnow::prelude::*;
use winnow::ascii::multispace1;
use winnow::combinator::{alt, delimited, opt, terminated};
use winnow::token::{one_of, take, take_until, take_while};

use crate::assoc_ast::*;
use crate::attribute::{Attribute, split_attributes};
use crate::error::{Error, Result};
use crate::leg::Leg;

/// Parses `name, card entity, ... : attribute, ...` into an association.
pub fn parse_clause(clause: &str, params: &Params) -> Result<Association> {
    let (name, rest) = clause
        .split_once(',')
        .ok_or_else(|| Error::MalformedClause {
            clause: clause.trim().to_string(),
        })?;
    let (legs_segment, attributes_segment) = rest.split_once(':').unwrap_or((rest, ""));

    let name = name.trim();
    let (name, is_inheritance) = match name.strip_prefix('/').and_then(|n| n.strip_suffix('\\')) {
        Some(inner) => (inner, true),
        None => (name, false),
    };
    let cartouche = strip_digit_suffix(name);

    let mut cards = Vec::new();
    let mut entities = Vec::new();
    for fragment in leg_fragments(legs_segment) {
        let (card, entity) = parse_leg(&fragment.compact).ok_or_else(|| Error::MalformedLeg {
            leg: fragment.written.clone(),
            association: name.to_string(),
        })?;
        cards.push(card);
        entities.push(entity);
    }

    let attributes: Vec<Attribute> = split_attributes(attributes_segment)?
        .iter()
        .enumerate()
        .map(|(i, raw)| Attribute::new(raw, i))
        .collect();

    let variant = Variant::classify(cartouche, is_inheritance, &params.df_label);
    if variant == Variant::Inheritance {
        if let Some(first) = cards.first_mut().filter(|card| card.direction.is_none()) {
            first.direction = Some(Direction::Forward);
        }
    }

    let occurrences = entity_occurrences(&entities);
    let legs: Vec<Leg> = cards
        .into_iter()
        .zip(&entities)
        .zip(occurrences)
        .map(|((card, entity), (count, index))| {
            let mut leg = Leg::new(name, card, entity, params);
            leg.set_spin(spin(count, index));
            if count > 1 {
                leg.mark_occurrence(index);
            }
            leg
        })
        .collect();

    tracing::debug!(
        association = name,
        ?variant,
        legs = legs.len(),
        attributes = attributes.len(),
        "parsed association clause"
    );

    Ok(Association {
        name: name.to_string(),
        cartouche: cartouche.to_string(),
        is_inheritance,
        variant,
        df_label: params.df_label.clone(),
        legs,
        attributes,
        geometry: None,
    })
}

/// Drops one trailing digit used to tell apart homonymous associations.
fn strip_digit_suffix(name: &str) -> &str {
    match name.chars().last() {
        Some(c) if c.is_ascii_digit() => &name[..name.len() - 1],
        _ => name,
    }
}

#[derive(Debug, PartialEq)]
struct LegFragment {
    /// As it appears in the clause, for diagnostics.
    written: String,
    /// With a comma-separated cardinality (`1,N A`) joined up (`1N A`).
    compact: String,
}

fn leg_fragments(segment: &str) -> Vec<LegFragment> {
    let pieces: Vec<&str> = segment.split(',').map(str::trim).collect();
    let mut fragments = Vec::with_capacity(pieces.len());
    let mut i = 0;
    while i < pieces.len() {
        let piece = pieces[i];
        match pieces.get(i + 1) {
            Some(next) if starts_cardinality(piece) && continues_cardinality(next) => {
                fragments.push(LegFragment {
                    written: format!("{piece},{next}"),
                    compact: format!("{piece}{next}"),
                });
                i += 2;
            }
            _ => {
                fragments.push(LegFragment {
                    written: piece.to_string(),
                    compact: piece.to_string(),
                });
                i += 1;
            }
        }
    }
    fragments
}

/// A lone minimum: one digit or the hidden marker `X`.
fn starts_cardinality(piece: &str) -> bool {
    let mut chars = piece.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), None) if c.is_ascii_digit() || c == 'X'
    )
}

/// A maximum (`1`, `N`, `n`, `X`, ...) directly followed by whitespace or a
/// direction marker.
fn continues_cardinality(fragment: &str) -> bool {
    let mut chars = fragment.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), Some(after))
            if (c.is_ascii_digit() || matches!(c, 'N' | 'n' | 'X'))
                && (after.is_whitespace() || after == '<' || after == '>')
    )
}

fn parse_leg(text: &str) -> Option<(Cardinality, String)> {
    let mut input = text;
    leg(&mut input).ok()
}

fn leg(input: &mut &str) -> winnow::Result<(Cardinality, String)> {
    let code = alt(("_11", take(2usize))).parse_next(input)?;
    let direction = opt(one_of(['<', '>'])).parse_next(input)?;
    multispace1.parse_next(input)?;
    let note = opt(terminated(delimited("[", take_until(1.., "]"), "]"), multispace1))
        .parse_next(input)?;
    let entity = take_while(1.., |_: char| true).parse_next(input)?;

    Ok((
        Cardinality {
            code: code.to_string(),
            direction: direction.map(|d| match d {
                '<' => Direction::Backward,
                _ => Direction::Forward,
            }),
            note: note.map(|n: &str| n.to_string()),
        },
        entity.trim().to_string(),
    ))
}

/// `(count, index)` per entity: how often it occurs among the legs and which
/// occurrence this one is, in clause order.
fn entity_occurrences(entities: &[String]) -> Vec<(usize, usize)> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for entity in entities {
        *totals.entry(entity).or_default() += 1;
    }
    let mut seen: HashMap<&str, usize> = HashMap::new();
    entities
        .iter()
        .map(|entity| {
            let index = seen.entry(entity).or_default();
            let occurrence = (totals[entity.as_str()], *index);
            *index += 1;
            occurrence
        })
        .collect()
}

/// Evenly spaced in `[-1, 1]` across the occurrences of one entity.
pub fn spin(count: usize, index: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        2.0 * index as f64 / (count - 1) as f64 - 1.0
    }
}
