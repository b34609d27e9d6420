use gd_dae::{AlgebraicDecl, Block, ParamDecl, Role, StateDecl, assemble};
use gd_symbolic::{Expr, Var};
use proptest::prelude::*;
use std::collections::HashSet;

/// Pool ids carry their role in the name so generated models never conflict.
fn pool_var(role: Role, k: usize) -> Var {
    let prefix = match role {
        Role::State => "x",
        Role::Algebraic => "y",
        Role::Parameter => "p",
    };
    Var::named(&format!("{prefix}{k}"))
}

fn build_blocks(layout: &[(Vec<usize>, Vec<usize>, Vec<usize>)]) -> Vec<Block> {
    layout.iter()
        .enumerate()
        .map(|(b, (xs, ys, ps))| {
            let mut block = Block::new(format!("b{b}"));
            for &k in ps {
                block = block.param(ParamDecl::new(&pool_var(Role::Parameter, k)).with_value(1.0));
            }
            for &k in xs {
                let v = pool_var(Role::State, k);
                block = block.state(StateDecl::new(&v, -1.0 * Expr::from(&v)));
            }
            for &k in ys {
                let v = pool_var(Role::Algebraic, k);
                block = block.algebraic(AlgebraicDecl::new(&v, Expr::from(&v)));
            }
            block
        })
        .collect()
}

fn block_layout() -> impl Strategy<Value = Vec<(Vec<usize>, Vec<usize>, Vec<usize>)>> {
    prop::collection::vec(
        (
            prop::collection::vec(0usize..6, 0..4),
            prop::collection::vec(0usize..6, 0..4),
            prop::collection::vec(0usize..6, 0..3),
        ),
        1..6,
    )
}

proptest! {
    #[test]
    fn slots_are_a_stable_bijection(layout in block_layout()) {
        let blocks = build_blocks(&layout);
        let sys = assemble(&blocks).unwrap();
        let again = assemble(&blocks).unwrap();

        let reg = sys.registry();
        let mut declared: HashSet<(String, Role)> = HashSet::new();
        for (xs, ys, ps) in &layout {
            declared.extend(xs.iter().map(|k| (format!("x{k}"), Role::State)));
            declared.extend(ys.iter().map(|k| (format!("y{k}"), Role::Algebraic)));
            declared.extend(ps.iter().map(|k| (format!("p{k}"), Role::Parameter)));
        }
        prop_assert_eq!(declared.len(), reg.n_vars() + reg.n_p());

        let mut var_slots = HashSet::new();
        let mut param_slots = HashSet::new();
        for (name, role) in &declared {
            let id = gd_core::VarId::new(name);
            prop_assert_eq!(reg.role_of(&id), Some(*role));
            match role {
                Role::Parameter => {
                    let j = reg.param_index(&id).unwrap();
                    prop_assert!(j < reg.n_p());
                    prop_assert!(param_slots.insert(j));
                }
                _ => {
                    let i = reg.var_index(&id).unwrap();
                    prop_assert!(i < reg.n_vars());
                    prop_assert!(var_slots.insert(i));
                    prop_assert_eq!(&reg.var_at(i).unwrap().id, &id);
                }
            }
            prop_assert_eq!(reg.var_index(&id), again.registry().var_index(&id));
            prop_assert_eq!(reg.param_index(&id), again.registry().param_index(&id));
        }
    }
}
