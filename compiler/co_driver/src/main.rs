//! `coc` — a minimal driver binary exercising the codegen core's smoke-test
//! path (spec.md §1: "parsing/resolution are out of scope and are stubbed
//! as a tiny in-memory AST constructor used by the binary's smoke-test
//! path, not a real parser").
//!
//! Build with the `llvm` feature (requires LLVM 17 installed) to actually
//! run the pipeline: `cargo run -p co_driver --features llvm`. Without the
//! feature this binary only reports which samples it would have built,
//! mirroring `oric`'s own `#[cfg(feature = "llvm")]` split between the
//! always-buildable frontend and the optional LLVM backend.

// Each sample needs its own `Context`: `IrValue<'ll>` ties the AST's
// memoized codegen cells to one specific LLVM context, so the package must
// be *built* against the same context that will later build it, not handed
// across from an unrelated one. `'ll` here is a single generic parameter
// shared between `context` and `pkg`, which is what lets the caller build
// the sample package and the context independently while keeping them tied
// together for this call.
#[cfg(feature = "llvm")]
fn run_sample<'ll>(name: &str, context: &'ll inkwell::context::Context, pkg: &co_ir::Package<'_, co_llvm::IrValue<'ll>>) -> bool {
    use co_diagnostic::Diagnostics;
    use co_driver::config::IntWidth;
    use co_driver::BuildConfig;

    let diagnostics = Diagnostics::new();
    let config = BuildConfig::new(IntWidth::host());

    match co_driver::build_and_verify(context, name, config, pkg, &diagnostics) {
        Ok(module) => {
            println!("ok   {name}: {} function(s) verified", module.get_functions().count());
            true
        }
        Err(e) => {
            eprintln!("fail {name}: {e}");
            false
        }
    }
}

#[cfg(feature = "llvm")]
fn main() {
    use co_driver::sample;
    use co_llvm::IrValue;
    use inkwell::context::Context;

    co_llvm::init_tracing();

    let arena = sample::SampleArena::new();
    let interner = co_ir::SymInterner::new(&arena.bump);
    let mut ok = true;

    let context = Context::create();
    let pkg = sample::identity_package::<IrValue<'_>>(&arena.bump, &interner);
    ok &= run_sample("identity", &context, &pkg);

    let context = Context::create();
    let pkg = sample::lt_package::<IrValue<'_>>(&arena.bump, &interner);
    ok &= run_sample("lt", &context, &pkg);

    let context = Context::create();
    let pkg = sample::pick_package::<IrValue<'_>>(&arena.bump, &interner);
    ok &= run_sample("pick", &context, &pkg);

    let context = Context::create();
    let pkg = sample::extern_package::<IrValue<'_>>(&arena.bump, &interner);
    ok &= run_sample("extern", &context, &pkg);

    if !ok {
        std::process::exit(1);
    }
}

#[cfg(not(feature = "llvm"))]
fn main() {
    eprintln!("coc: built without the `llvm` feature; nothing to run.");
    eprintln!("Rebuild with `cargo run -p co_driver --features llvm` (requires LLVM 17).");
}
