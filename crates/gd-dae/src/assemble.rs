//! Merge blocks into one global system.

use crate::block::Block;
use crate::error::{DaeError, DaeResult};
use crate::jacobian::SparseJacobian;
use crate::registry::{IndexRegistry, Role};
use crate::system::DaeSystem;
use gd_symbolic::{Compiled, Expr, SymbolicError, Var};
use tracing::debug;

struct StateSlot {
    rhs: Expr,
    time_constant: Option<Expr>,
    init: Option<Expr>,
}

struct AlgebraicSlot {
    eq: Expr,
    init: Option<Expr>,
}

/// Assemble blocks (and their children) into a [`DaeSystem`].
///
/// Slots are allocated per role in first-declaration order. Repeated
/// declarations of one id with one role share the slot and their equation
/// contributions are summed.
pub fn assemble(blocks: &[Block]) -> DaeResult<DaeSystem> {
    let mut reg = IndexRegistry::new();
    let mut states: Vec<StateSlot> = Vec::new();
    let mut algebraics: Vec<AlgebraicSlot> = Vec::new();
    let mut param_defaults: Vec<Option<f64>> = Vec::new();

    for block in blocks.iter().flat_map(Block::all_blocks) {
        let owner = reg.add_block(&block.name);

        for decl in &block.params {
            let i = declare(&mut reg, &decl.var, Role::Parameter, owner)?;
            if i == param_defaults.len() {
                param_defaults.push(decl.value);
            } else if let Some(v) = decl.value {
                match param_defaults[i] {
                    Some(prev) if prev != v => {
                        return Err(duplicate(&decl.var, "default value"));
                    }
                    Some(_) => {}
                    None => param_defaults[i] = Some(v),
                }
            }
        }

        for decl in &block.states {
            let i = declare(&mut reg, &decl.var, Role::State, owner)?;
            if i == states.len() {
                states.push(StateSlot {
                    rhs: decl.rhs.clone(),
                    time_constant: decl.time_constant.clone(),
                    init: decl.init.clone(),
                });
            } else {
                let slot = &mut states[i];
                slot.rhs = Expr::add(slot.rhs.clone(), decl.rhs.clone());
                merge_once(
                    &mut slot.time_constant,
                    &decl.time_constant,
                    &decl.var,
                    "time constant",
                )?;
                merge_once(&mut slot.init, &decl.init, &decl.var, "initial guess")?;
            }
        }

        for decl in &block.algebraics {
            let i = declare(&mut reg, &decl.var, Role::Algebraic, owner)?;
            if i == algebraics.len() {
                algebraics.push(AlgebraicSlot {
                    eq: decl.eq.clone(),
                    init: decl.init.clone(),
                });
            } else {
                let slot = &mut algebraics[i];
                slot.eq = Expr::add(slot.eq.clone(), decl.eq.clone());
                merge_once(&mut slot.init, &decl.init, &decl.var, "initial guess")?;
            }
        }
    }

    let n_x = reg.n_x();
    let n_y = reg.n_y();

    let f: Vec<Expr> = states.iter().map(|s| s.rhs.clone()).collect();
    let g: Vec<Expr> = algebraics.iter().map(|s| s.eq.clone()).collect();

    let mut f_c = Vec::with_capacity(n_x);
    let mut t_c = Vec::with_capacity(n_x);
    let mut init_c = Vec::with_capacity(n_x + n_y);
    for (var, slot) in reg.states().iter().zip(&states) {
        f_c.push(compile(&slot.rhs, &reg, || format!("f[{}]", var.name))?);
        t_c.push(match &slot.time_constant {
            Some(t) => parameter_only(t, &reg, var, "time constant")?,
            None => Compiled::Const(1.0),
        });
        init_c.push(match &slot.init {
            Some(e) => Some(parameter_only(e, &reg, var, "initial guess")?),
            None => None,
        });
    }

    let mut g_c = Vec::with_capacity(n_y);
    for (var, slot) in reg.algebraics().iter().zip(&algebraics) {
        g_c.push(compile(&slot.eq, &reg, || format!("g[{}]", var.name))?);
        init_c.push(match &slot.init {
            Some(e) => Some(parameter_only(e, &reg, var, "initial guess")?),
            None => None,
        });
    }

    let mut fx = SparseJacobian::new(n_x, n_x);
    let mut fy = SparseJacobian::new(n_x, n_y);
    let mut gx = SparseJacobian::new(n_y, n_x);
    let mut gy = SparseJacobian::new(n_y, n_y);
    let mut fp = SparseJacobian::new(n_x, reg.n_p());
    let mut gp = SparseJacobian::new(n_y, reg.n_p());
    for (row, eq) in f.iter().enumerate() {
        differentiate_row(eq, row, &reg, [&mut fx, &mut fy, &mut fp])?;
    }
    for (row, eq) in g.iter().enumerate() {
        differentiate_row(eq, row, &reg, [&mut gx, &mut gy, &mut gp])?;
    }

    debug!(
        blocks = reg.block_names().len(),
        n_x,
        n_y,
        n_p = reg.n_p(),
        nnz = fx.nnz() + fy.nnz() + gx.nnz() + gy.nnz(),
        "assembled DAE system"
    );

    Ok(DaeSystem {
        registry: reg,
        f,
        g,
        f_c,
        g_c,
        t_c,
        init_c,
        param_defaults,
        fx,
        fy,
        gx,
        gy,
        fp,
        gp,
    })
}

fn declare(reg: &mut IndexRegistry, var: &Var, role: Role, owner: usize) -> DaeResult<usize> {
    reg.declare(var, role, owner)
        .map_err(|first| DaeError::VariableRoleConflict {
            id: var.id.clone(),
            name: var.name.clone(),
            first,
            second: role,
        })
}

fn duplicate(var: &Var, what: &'static str) -> DaeError {
    DaeError::DuplicateDefinition {
        id: var.id.clone(),
        name: var.name.clone(),
        what,
    }
}

fn merge_once(
    slot: &mut Option<Expr>,
    incoming: &Option<Expr>,
    var: &Var,
    what: &'static str,
) -> DaeResult<()> {
    match (slot.as_ref(), incoming) {
        (Some(_), Some(_)) => Err(duplicate(var, what)),
        (None, Some(e)) => {
            *slot = Some(e.clone());
            Ok(())
        }
        _ => Ok(()),
    }
}

fn compile(
    e: &Expr,
    reg: &IndexRegistry,
    context: impl FnOnce() -> String,
) -> DaeResult<Compiled> {
    e.compile(reg).map_err(|err| match err {
        SymbolicError::UnresolvedSymbol { id, name }
        | SymbolicError::UnboundVariable { id, name } => DaeError::UnresolvedSymbol {
            id,
            name,
            context: context(),
        },
    })
}

fn parameter_only(
    e: &Expr,
    reg: &IndexRegistry,
    var: &Var,
    what: &'static str,
) -> DaeResult<Compiled> {
    let c = compile(e, reg, || format!("{what} of {}", var.name))?;
    if c.is_var_free() {
        Ok(c)
    } else {
        Err(DaeError::NotParameterOnly {
            id: var.id.clone(),
            name: var.name.clone(),
            what,
        })
    }
}

/// Differentiate one equation into the `[wrt x, wrt y, wrt p]` Jacobians.
fn differentiate_row(
    eq: &Expr,
    row: usize,
    reg: &IndexRegistry,
    targets: [&mut SparseJacobian; 3],
) -> DaeResult<()> {
    let [wrt_x, wrt_y, wrt_p] = targets;
    for var in eq.free_vars() {
        let (target, col) = match (reg.role_of(&var.id), reg.index_of(&var.id)) {
            (Some(Role::State), Some(col)) => (&mut *wrt_x, col),
            (Some(Role::Algebraic), Some(col)) => (&mut *wrt_y, col),
            (Some(Role::Parameter), Some(col)) => (&mut *wrt_p, col),
            _ => continue,
        };
        let d = eq.diff(&var.id);
        if d.is_zero() {
            continue;
        }
        let c = compile(&d, reg, || format!("d/d{}", var.name))?;
        target.push(row, col, c);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{AlgebraicDecl, ParamDecl, StateDecl};
    use gd_symbolic::sin;

    fn vars() -> (Var, Var, Var, Var) {
        (
            Var::named("delta"),
            Var::named("theta"),
            Var::named("pm"),
            Var::named("k"),
        )
    }

    #[test]
    fn slots_follow_first_declaration_order() {
        let (delta, theta, pm, k) = vars();
        let gen_block = Block::new("gen")
            .param(ParamDecl::new(&pm).with_value(0.8))
            .state(StateDecl::new(&delta, &pm - sin(&delta - &theta)))
            .algebraic(AlgebraicDecl::new(&theta, sin(&delta - &theta)));
        let bus = Block::new("bus")
            .param(ParamDecl::new(&k).with_value(2.0))
            .algebraic(AlgebraicDecl::new(&theta, -1.0 * &k * &theta).with_init(0.0));

        let sys = assemble(&[gen_block, bus]).unwrap();
        assert_eq!(sys.n_x(), 1);
        assert_eq!(sys.n_y(), 1);
        assert_eq!(sys.n_p(), 2);
        assert_eq!(sys.index_of(&k.id), Some(1));
        assert_eq!(sys.var_owner(&theta.id), Some("gen"));

        // g[theta] is the sum of both contributions.
        let g = sys.eval_g(&[0.5, 0.1], &[0.8, 2.0]).unwrap();
        assert!((g[0] - ((0.4f64).sin() - 0.2)).abs() < 1e-15);
    }

    #[test]
    fn role_conflict_is_fatal() {
        let (delta, ..) = vars();
        let a = Block::new("a").state(StateDecl::new(&delta, 0.0));
        let b = Block::new("b").algebraic(AlgebraicDecl::new(&delta, 0.0));
        let err = assemble(&[a, b]).unwrap_err();
        assert!(matches!(
            err,
            DaeError::VariableRoleConflict {
                first: Role::State,
                second: Role::Algebraic,
                ..
            }
        ));
    }

    #[test]
    fn conflicting_defaults_and_guesses_are_duplicates() {
        let (delta, _, pm, _) = vars();
        let a = Block::new("a").param(ParamDecl::new(&pm).with_value(1.0));
        let b = Block::new("b").param(ParamDecl::new(&pm).with_value(2.0));
        assert!(matches!(
            assemble(&[a, b]),
            Err(DaeError::DuplicateDefinition { what: "default value", .. })
        ));

        let a = Block::new("a").state(StateDecl::new(&delta, 0.0).with_init(1.0));
        let b = Block::new("b").state(StateDecl::new(&delta, 0.0).with_init(1.0));
        assert!(matches!(
            assemble(&[a, b]),
            Err(DaeError::DuplicateDefinition { what: "initial guess", .. })
        ));
    }

    #[test]
    fn undeclared_reference_is_unresolved() {
        let (delta, theta, ..) = vars();
        let a = Block::new("a").state(StateDecl::new(&delta, &theta - &delta));
        let err = assemble(&[a]).unwrap_err();
        match err {
            DaeError::UnresolvedSymbol { name, context, .. } => {
                assert_eq!(name, "theta");
                assert_eq!(context, "f[delta]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn time_constant_must_be_parameter_only() {
        let (delta, theta, ..) = vars();
        let a = Block::new("a")
            .state(StateDecl::new(&delta, 0.0).with_time_constant(&theta))
            .algebraic(AlgebraicDecl::new(&theta, &theta));
        assert!(matches!(
            assemble(&[a]),
            Err(DaeError::NotParameterOnly { what: "time constant", .. })
        ));
    }

    #[test]
    fn jacobian_keeps_structural_nonzeros() {
        let (delta, theta, pm, _) = vars();
        let a = Block::new("a")
            .param(ParamDecl::new(&pm).with_value(1.0))
            .state(StateDecl::new(&delta, &pm * &theta).with_time_constant(&pm * 2.0))
            .algebraic(AlgebraicDecl::new(&theta, &theta - 3.0));
        let sys = assemble(&[a]).unwrap();
        let (fx, fy, gx, gy) = sys.jacobian_patterns();
        assert_eq!(fx.nnz(), 0);
        assert_eq!(fy.nnz(), 1);
        assert_eq!(gx.nnz(), 0);
        assert_eq!(gy.nnz(), 1);

        let j = sys.jacobians(&[0.0, 5.0], &[4.0]).unwrap();
        assert_eq!(j.fy[(0, 0)], 4.0);
        assert_eq!(j.gy[(0, 0)], 1.0);
        assert_eq!(sys.eval_t(&[4.0]).unwrap()[0], 8.0);
    }
}
