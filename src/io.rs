//! # Population Disk Format
//!
//! A tagged binary record holding a whole population: format and
//! version strings, the population scalars, an operator-identification
//! table and one record per entity (fitness plus a length-prefixed
//! chromosome blob), closed by an `END` marker. All integers are
//! little-endian.
//!
//! Operator identities are the small integers from the operator enums:
//! `0` marks an unset slot and `-1` an external algorithm. Reading an
//! unrecognized identity never fails the load; the slot degrades to
//! unset with a warning, because a population's genetic payload is
//! still perfectly usable under different operators.

use std::io::{Read, Write};

use tracing::warn;

use crate::chromosome::{AlleleBounds, Representation, RepresentationKind};
use crate::error::{GeneticError, Result};
use crate::operators::{
    CrossoverOperator, MutationOperator, RankOperator, ReplaceOperator, SeedOperator, SelectOne,
    SelectTwo,
};
use crate::population::{Elitism, Population};

const FORMAT_TAG: &[u8; 30] = b"FORMAT: GENPOOL POPULATION 001";
const VERSION_FIELD_LEN: usize = 64;
const END_TAG: &[u8; 4] = b"END\0";

/// Writes a population and its genetic data in the binary format.
/// Entity payloads are opaque to the engine and are not stored.
pub fn write_population<R, W>(pop: &Population<R>, writer: &mut W) -> Result<()>
where
    R: Representation,
    W: Write,
{
    writer.write_all(FORMAT_TAG)?;

    let mut version = [0u8; VERSION_FIELD_LEN];
    let version_string = concat!("genpool ", env!("CARGO_PKG_VERSION"));
    let len = version_string.len().min(VERSION_FIELD_LEN);
    version[..len].copy_from_slice(&version_string.as_bytes()[..len]);
    writer.write_all(&version)?;

    write_i32(writer, pop.representation().kind().id())?;
    write_u32(writer, pop.size() as u32)?;
    write_u32(writer, pop.stable_size() as u32)?;
    write_u32(writer, pop.shape().num_chromosomes as u32)?;
    write_u32(writer, pop.shape().len_chromosomes as u32)?;

    write_f64(writer, pop.crossover_ratio())?;
    write_f64(writer, pop.mutation_ratio())?;
    write_f64(writer, pop.migration_ratio())?;
    write_f64(writer, pop.allele_mutation_prob())?;
    write_i64(writer, pop.bounds().min_integer)?;
    write_i64(writer, pop.bounds().max_integer)?;
    write_f64(writer, pop.bounds().min_real)?;
    write_f64(writer, pop.bounds().max_real)?;
    write_i32(writer, pop.elitism().id())?;

    // Operator-identification table.
    let ops = pop.ops();
    write_i32(writer, ops.seed.map_or(0, SeedOperator::id))?;
    write_i32(writer, ops.select_one.map_or(0, SelectOne::id))?;
    write_i32(writer, ops.select_two.map_or(0, SelectTwo::id))?;
    write_i32(writer, ops.crossover.map_or(0, CrossoverOperator::id))?;
    write_i32(writer, ops.mutate.map_or(0, MutationOperator::id))?;
    write_i32(writer, ops.replace.map_or(0, ReplaceOperator::id))?;
    write_i32(writer, ops.rank.id())?;

    for rank in 0..pop.size() {
        let entity = pop.entity_by_rank(rank)?;
        write_f64(writer, entity.fitness())?;
        let mut blob = Vec::new();
        for chromosome in entity.chromosomes() {
            let bytes = pop.representation().to_bytes(chromosome)?;
            blob.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            blob.extend_from_slice(&bytes);
        }
        write_u32(writer, blob.len() as u32)?;
        writer.write_all(&blob)?;
    }

    writer.write_all(END_TAG)?;
    Ok(())
}

/// Reads a population previously written with [`write_population`].
/// The caller supplies the representation, which must match the stored
/// representation tag.
pub fn read_population<R, Rd>(reader: &mut Rd, representation: R) -> Result<Population<R>>
where
    R: Representation,
    Rd: Read,
{
    let mut tag = [0u8; FORMAT_TAG.len()];
    reader.read_exact(&mut tag)?;
    if &tag != FORMAT_TAG {
        return Err(GeneticError::Format(
            "unrecognized population format tag".to_string(),
        ));
    }
    let mut version = [0u8; VERSION_FIELD_LEN];
    reader.read_exact(&mut version)?;

    let kind_id = read_i32(reader)?;
    match RepresentationKind::from_id(kind_id) {
        Some(kind) if kind == representation.kind() => {}
        Some(kind) => {
            return Err(GeneticError::ShapeMismatch(format!(
                "population was written with the {:?} representation, not {:?}",
                kind,
                representation.kind()
            )));
        }
        None => {
            return Err(GeneticError::Format(format!(
                "unknown representation tag {}",
                kind_id
            )));
        }
    }

    let size = read_u32(reader)? as usize;
    let stable_size = read_u32(reader)? as usize;
    let num_chromosomes = read_u32(reader)? as usize;
    let len_chromosomes = read_u32(reader)? as usize;

    let crossover_ratio = read_f64(reader)?;
    let mutation_ratio = read_f64(reader)?;
    let migration_ratio = read_f64(reader)?;
    let allele_mutation_prob = read_f64(reader)?;
    let bounds = AlleleBounds {
        min_integer: read_i64(reader)?,
        max_integer: read_i64(reader)?,
        min_real: read_f64(reader)?,
        max_real: read_f64(reader)?,
    };
    let elitism_id = read_i32(reader)?;
    let elitism = match Elitism::from_id(elitism_id) {
        Some(e) => e,
        None => {
            warn!(id = elitism_id, "unrecognized elitism policy, using default");
            Elitism::default()
        }
    };

    let mut pop = Population::builder(representation)
        .stable_size(stable_size)
        .shape(num_chromosomes, len_chromosomes)
        .bounds(bounds)
        .crossover_ratio(crossover_ratio)
        .mutation_ratio(mutation_ratio)
        .migration_ratio(migration_ratio)
        .allele_mutation_prob(allele_mutation_prob)
        .elitism(elitism)
        .build()?;

    let mut unrecognized = 0;
    let seed_id = read_i32(reader)?;
    pop.ops_mut().seed = lookup(seed_id, SeedOperator::from_id, "seed", &mut unrecognized);
    let select_one_id = read_i32(reader)?;
    pop.ops_mut().select_one = lookup(
        select_one_id,
        SelectOne::from_id,
        "select_one",
        &mut unrecognized,
    );
    let select_two_id = read_i32(reader)?;
    pop.ops_mut().select_two = lookup(
        select_two_id,
        SelectTwo::from_id,
        "select_two",
        &mut unrecognized,
    );
    let crossover_id = read_i32(reader)?;
    pop.ops_mut().crossover = lookup(
        crossover_id,
        CrossoverOperator::from_id,
        "crossover",
        &mut unrecognized,
    );
    let mutate_id = read_i32(reader)?;
    pop.ops_mut().mutate = lookup(
        mutate_id,
        MutationOperator::from_id,
        "mutate",
        &mut unrecognized,
    );
    let replace_id = read_i32(reader)?;
    pop.ops_mut().replace = lookup(
        replace_id,
        ReplaceOperator::from_id,
        "replace",
        &mut unrecognized,
    );
    let rank_id = read_i32(reader)?;
    pop.ops_mut().rank = match RankOperator::from_id(rank_id) {
        Some(rank) => rank,
        None => {
            unrecognized += 1;
            warn!(id = rank_id, "unrecognized rank operator, using default");
            RankOperator::Fitness
        }
    };
    if unrecognized > 0 {
        warn!(
            count = unrecognized,
            "population file referenced operators this build cannot name; those slots are unset"
        );
    }

    for _ in 0..size {
        let fitness = read_f64(reader)?;
        let blob_len = read_u32(reader)? as usize;
        let mut blob = vec![0u8; blob_len];
        reader.read_exact(&mut blob)?;

        let id = pop.acquire();
        let mut offset = 0usize;
        for chromosome_index in 0..num_chromosomes {
            if offset + 4 > blob.len() {
                return Err(GeneticError::Format(
                    "entity record truncated inside chromosome table".to_string(),
                ));
            }
            let len =
                u32::from_le_bytes(blob[offset..offset + 4].try_into().expect("4 bytes")) as usize;
            offset += 4;
            if offset + len > blob.len() {
                return Err(GeneticError::Format(
                    "entity record truncated inside chromosome data".to_string(),
                ));
            }
            let chromosome = pop
                .representation()
                .from_bytes(len_chromosomes, &blob[offset..offset + len])?;
            offset += len;
            pop.entity_mut(id)?.chromosomes_mut()[chromosome_index] = chromosome;
        }
        pop.entity_mut(id)?.set_fitness(fitness);
    }

    let mut end = [0u8; END_TAG.len()];
    reader.read_exact(&mut end)?;
    if &end != END_TAG {
        return Err(GeneticError::Format(
            "population file is missing its end marker".to_string(),
        ));
    }

    Ok(pop)
}

fn lookup<T>(
    id: i32,
    from_id: fn(i32) -> Option<T>,
    slot: &'static str,
    unrecognized: &mut usize,
) -> Option<T> {
    if id == 0 {
        return None;
    }
    match from_id(id) {
        Some(op) => Some(op),
        None => {
            *unrecognized += 1;
            warn!(id, slot, "unrecognized operator id, leaving slot unset");
            None
        }
    }
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_i64<W: Write>(writer: &mut W, value: i64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f64<W: Write>(writer: &mut W, value: f64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(i64::from_le_bytes(bytes))
}

fn read_f64<R: Read>(reader: &mut R) -> Result<f64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(f64::from_le_bytes(bytes))
}
