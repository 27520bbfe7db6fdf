//! The tagged-union node payload and the small operator/helper enums it is
//! built from.
//!
//! One flat `NodeKind` enum carrying typed payloads per variant, rather than
//! a base-class-plus-discriminator shape, so the discriminator and its
//! payload can never drift apart. Every variant lists its children in the
//! exact order the grammar constructs them, which is also the order
//! [`NodeKind::children`] walks them in.

use cxy_common::{ArenaVec, FloatKind, InternedStr, IntegerKind, TokenKind};

use crate::node::Node;

/// One segment of a [`NodeKind::QualifiedPath`]: a bare name, optionally
/// followed by a `<...>` type-argument list. Segment names are never dotted
/// strings; the `.` separator between segments is structural.
#[derive(Debug)]
pub struct PathSegment<'bump> {
    pub name: InternedStr<'bump>,
    pub type_args: ArenaVec<'bump, &'bump Node<'bump>>,
}

/// Binary operators, as disambiguated by the precedence grammar.
/// `is`/`as`/`!:` are modeled as their own node shapes ([`NodeKind::
/// Cast`], [`NodeKind::Is`]) rather than as a `BinaryOp` variant, since they
/// take a type operand on the right, not an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// Unary operators. `prefix: bool` on [`NodeKind::Unary`] distinguishes
/// `++x`/`--x` from `x++`/`x--`; every other unary operator is prefix-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Unary `+`, a no-op sign prefix.
    Plus,
    Neg,
    Not,
    BitNot,
    Inc,
    Dec,
    /// `&`, address-of.
    AddrOf,
    /// Unary `^`, valid only in prefix position; not a legal
    /// unary-operator overload target.
    Caret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// `as` vs. `!:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    As,
    Retype,
}

#[derive(Debug)]
pub enum Literal<'bump> {
    Int(u128, IntegerKind),
    Float(f64, FloatKind),
    Char(char),
    Str(InternedStr<'bump>),
    Bool(bool),
    Null,
}

/// One fragment of a [`NodeKind::StringExpr`]: either literal text or an
/// embedded expression.
#[derive(Debug)]
pub enum StringPart<'bump> {
    Text(InternedStr<'bump>),
    Expr(&'bump Node<'bump>),
}

/// `named fields` of a [`NodeKind::StructLiteral`]: `name: value`.
#[derive(Debug)]
pub struct FieldInit<'bump> {
    pub name: InternedStr<'bump>,
    pub value: &'bump Node<'bump>,
}

/// A `case` of a [`NodeKind::Switch`] statement.
#[derive(Debug)]
pub struct SwitchCase<'bump> {
    pub values: ArenaVec<'bump, &'bump Node<'bump>>,
    pub is_default: bool,
    pub body: ArenaVec<'bump, &'bump Node<'bump>>,
}

/// An arm of a [`NodeKind::Match`] statement.
#[derive(Debug)]
pub struct MatchArm<'bump> {
    pub types: ArenaVec<'bump, &'bump Node<'bump>>,
    pub is_default: bool,
    pub binding: Option<InternedStr<'bump>>,
    pub body: &'bump Node<'bump>,
}

/// One `{orig [as alias]}` entry of a [`NodeKind::Import`] named-import list.
#[derive(Debug)]
pub struct ImportItem<'bump> {
    pub name: InternedStr<'bump>,
    pub alias: Option<InternedStr<'bump>>,
}

/// Which of the four import forms a [`NodeKind::Import`] node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    WholeModule,
    ModuleAlias,
    MultipleImports,
    ConditionalTest,
}

/// Every terminal/nonterminal shape an AST node can take, grouped into
/// literals / identifiers-paths / expressions / statements / declarations /
/// type expressions.
#[derive(Debug)]
pub enum NodeKind<'bump> {
    // ── Literals ──────────────────────────────────────────────────────
    Literal(Literal<'bump>),

    // ── Identifiers / paths ──────────────────────────────────────────
    /// `resolved` is left `None` by this frontend; populated by a later
    /// semantic pass.
    Identifier {
        name: InternedStr<'bump>,
        resolved: std::cell::Cell<Option<crate::node::NodeId>>,
    },
    QualifiedPath {
        /// `true` when the path had a leading `::`, which introduces a
        /// qualified path expression in expression context.
        rooted: bool,
        segments: Vec<PathSegment<'bump>>,
    },

    // ── Expressions ───────────────────────────────────────────────────
    Unary {
        op: UnaryOp,
        prefix: bool,
        operand: &'bump Node<'bump>,
    },
    Binary {
        op: BinaryOp,
        lhs: &'bump Node<'bump>,
        rhs: &'bump Node<'bump>,
    },
    Ternary {
        cond: &'bump Node<'bump>,
        then_branch: &'bump Node<'bump>,
        else_branch: &'bump Node<'bump>,
    },
    Assignment {
        op: AssignOp,
        target: &'bump Node<'bump>,
        value: &'bump Node<'bump>,
    },
    /// A parenthesized expression, kept as its own node so the formatter
    /// and any later pretty-printer can preserve the source grouping.
    Group(&'bump Node<'bump>),
    Cast {
        expr: &'bump Node<'bump>,
        type_expr: &'bump Node<'bump>,
        kind: CastKind,
    },
    /// `expr is TypeExpr`, the type-test operator. Not part of the
    /// binary-op precedence ladder because its right operand is a type,
    /// not an expression.
    Is {
        expr: &'bump Node<'bump>,
        type_expr: &'bump Node<'bump>,
    },
    Call {
        callee: &'bump Node<'bump>,
        args: ArenaVec<'bump, &'bump Node<'bump>>,
    },
    Index {
        object: &'bump Node<'bump>,
        index: &'bump Node<'bump>,
    },
    Member {
        object: &'bump Node<'bump>,
        name: InternedStr<'bump>,
        /// `true` for `&.` (pointer-member access), `false` for plain `.`.
        arrow: bool,
    },
    Array(ArenaVec<'bump, &'bump Node<'bump>>),
    Tuple(ArenaVec<'bump, &'bump Node<'bump>>),
    /// `Type { field: value, ... }` struct literal. `type_expr` is `None`
    /// for a bare `{ ... }` literal whose type is inferred from context.
    StructLiteral {
        type_expr: Option<&'bump Node<'bump>>,
        fields: Vec<FieldInit<'bump>>,
    },
    MacroCall {
        name: InternedStr<'bump>,
        args: ArenaVec<'bump, &'bump Node<'bump>>,
    },
    Closure {
        params: ArenaVec<'bump, &'bump Node<'bump>>,
        body: &'bump Node<'bump>,
    },
    Range {
        start: Option<&'bump Node<'bump>>,
        end: Option<&'bump Node<'bump>>,
        inclusive: bool,
    },
    Spread(&'bump Node<'bump>),
    StringExpr(Vec<StringPart<'bump>>),

    // ── Statements ────────────────────────────────────────────────────
    ExprStmt(&'bump Node<'bump>),
    Break,
    Continue,
    Defer(&'bump Node<'bump>),
    Return(Option<&'bump Node<'bump>>),
    Yield(Option<&'bump Node<'bump>>),
    Block(ArenaVec<'bump, &'bump Node<'bump>>),
    If {
        cond: &'bump Node<'bump>,
        then_branch: &'bump Node<'bump>,
        else_branch: Option<&'bump Node<'bump>>,
    },
    For {
        vars: Vec<InternedStr<'bump>>,
        range: &'bump Node<'bump>,
        cond: Option<&'bump Node<'bump>>,
        body: &'bump Node<'bump>,
    },
    While {
        cond: Option<&'bump Node<'bump>>,
        body: &'bump Node<'bump>,
    },
    Switch {
        discriminant: &'bump Node<'bump>,
        cases: Vec<SwitchCase<'bump>>,
    },
    Match {
        discriminant: &'bump Node<'bump>,
        arms: Vec<MatchArm<'bump>>,
    },

    // ── Declarations ──────────────────────────────────────────────────
    Variable {
        names: Vec<InternedStr<'bump>>,
        type_expr: Option<&'bump Node<'bump>>,
        init: Option<&'bump Node<'bump>>,
    },
    Func {
        /// `None` for an operator-overload declaration; the operator
        /// itself is recorded via [`Node::flags`]-adjacent metadata is not
        /// needed since the backtick-delimited token text is interned here.
        name: Option<InternedStr<'bump>>,
        operator_name: Option<InternedStr<'bump>>,
        params: ArenaVec<'bump, &'bump Node<'bump>>,
        return_type: Option<&'bump Node<'bump>>,
        body: Option<&'bump Node<'bump>>,
    },
    FuncParam {
        name: InternedStr<'bump>,
        type_expr: &'bump Node<'bump>,
        default: Option<&'bump Node<'bump>>,
    },
    TypeAlias {
        name: InternedStr<'bump>,
        type_expr: &'bump Node<'bump>,
    },
    Enum {
        name: InternedStr<'bump>,
        base_type: Option<&'bump Node<'bump>>,
        options: ArenaVec<'bump, &'bump Node<'bump>>,
    },
    EnumOption {
        name: InternedStr<'bump>,
        value: Option<&'bump Node<'bump>>,
    },
    /// Covers both `struct` and `class`, which share one grammar; `is_class`
    /// plus `base` (only ever set for a class) distinguish them.
    Struct {
        name: InternedStr<'bump>,
        is_class: bool,
        base: Option<&'bump Node<'bump>>,
        members: ArenaVec<'bump, &'bump Node<'bump>>,
    },
    Field {
        name: InternedStr<'bump>,
        type_expr: &'bump Node<'bump>,
        init: Option<&'bump Node<'bump>>,
    },
    Module {
        name: Option<InternedStr<'bump>>,
        top_level: ArenaVec<'bump, &'bump Node<'bump>>,
        main_content: ArenaVec<'bump, &'bump Node<'bump>>,
    },
    Import {
        kind: ImportKind,
        path: InternedStr<'bump>,
        alias: Option<InternedStr<'bump>>,
        entities: Vec<ImportItem<'bump>>,
    },
    Generic {
        type_params: ArenaVec<'bump, &'bump Node<'bump>>,
        decl: &'bump Node<'bump>,
    },
    TypeParameter {
        name: InternedStr<'bump>,
        variadic: bool,
        constraint: Option<&'bump Node<'bump>>,
        default: Option<&'bump Node<'bump>>,
    },

    // ── Type expressions ──────────────────────────────────────────────
    PrimitiveType(TokenKind),
    ArrayType {
        size: Option<&'bump Node<'bump>>,
        element: &'bump Node<'bump>,
    },
    TupleType(ArenaVec<'bump, &'bump Node<'bump>>),
    UnionType(ArenaVec<'bump, &'bump Node<'bump>>),
    PointerType(&'bump Node<'bump>),
    ReferenceType(&'bump Node<'bump>),
    OptionalType(&'bump Node<'bump>),
    ResultType(&'bump Node<'bump>),
    FunctionType {
        params: ArenaVec<'bump, &'bump Node<'bump>>,
        return_type: &'bump Node<'bump>,
    },

    /// A parse-error placeholder: the method that would have produced a
    /// node failed and logged a diagnostic instead. Carries no payload;
    /// its [`Node::location`] still points at the offending span so
    /// downstream passes have somewhere to anchor a secondary error.
    Error,
}

impl<'bump> NodeKind<'bump> {
    /// This node's direct children, in source order, regardless of kind.
    /// Optional children that are absent are simply omitted.
    pub fn children(&self) -> Vec<&'bump Node<'bump>> {
        use NodeKind::*;
        match self {
            Literal(_) | Break | Continue | Error | PrimitiveType(_) => vec![],
            Identifier { .. } => vec![],
            QualifiedPath { segments, .. } => segments.iter().flat_map(|s| s.type_args.iter().copied()).collect(),
            Unary { operand, .. } => vec![*operand],
            Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            Ternary {
                cond,
                then_branch,
                else_branch,
            } => vec![*cond, *then_branch, *else_branch],
            Assignment { target, value, .. } => vec![*target, *value],
            Group(e) => vec![*e],
            Cast { expr, type_expr, .. } => vec![*expr, *type_expr],
            Is { expr, type_expr } => vec![*expr, *type_expr],
            Call { callee, args } => std::iter::once(*callee).chain(args.iter().copied()).collect(),
            Index { object, index } => vec![*object, *index],
            Member { object, .. } => vec![*object],
            Array(elems) | Tuple(elems) => elems.iter().copied().collect(),
            StructLiteral { type_expr, fields } => type_expr
                .into_iter()
                .copied()
                .chain(fields.iter().map(|f| f.value))
                .collect(),
            MacroCall { args, .. } => args.iter().copied().collect(),
            Closure { params, body } => params.iter().copied().chain(std::iter::once(*body)).collect(),
            Range { start, end, .. } => start.iter().copied().chain(end.iter().copied()).collect(),
            Spread(e) => vec![*e],
            StringExpr(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    StringPart::Expr(e) => Some(*e),
                    StringPart::Text(_) => None,
                })
                .collect(),
            ExprStmt(e) | Defer(e) => vec![*e],
            Return(e) | Yield(e) => e.iter().copied().collect(),
            Block(stmts) => stmts.iter().copied().collect(),
            If {
                cond,
                then_branch,
                else_branch,
            } => std::iter::once(*cond)
                .chain(std::iter::once(*then_branch))
                .chain(else_branch.iter().copied())
                .collect(),
            For { range, cond, body, .. } => std::iter::once(*range).chain(cond.iter().copied()).chain(std::iter::once(*body)).collect(),
            While { cond, body } => cond.iter().copied().chain(std::iter::once(*body)).collect(),
            Switch { discriminant, cases } => std::iter::once(*discriminant)
                .chain(cases.iter().flat_map(|c| c.values.iter().copied().chain(c.body.iter().copied())))
                .collect(),
            Match { discriminant, arms } => std::iter::once(*discriminant)
                .chain(arms.iter().flat_map(|a| a.types.iter().copied().chain(std::iter::once(a.body))))
                .collect(),
            Variable { type_expr, init, .. } => type_expr.iter().copied().chain(init.iter().copied()).collect(),
            Func {
                params,
                return_type,
                body,
                ..
            } => params
                .iter()
                .copied()
                .chain(return_type.iter().copied())
                .chain(body.iter().copied())
                .collect(),
            FuncParam { type_expr, default, .. } => std::iter::once(*type_expr).chain(default.iter().copied()).collect(),
            TypeAlias { type_expr, .. } => vec![*type_expr],
            Enum { base_type, options, .. } => base_type.iter().copied().chain(options.iter().copied()).collect(),
            EnumOption { value, .. } => value.iter().copied().collect(),
            Struct { base, members, .. } => base.iter().copied().chain(members.iter().copied()).collect(),
            Field { type_expr, init, .. } => std::iter::once(*type_expr).chain(init.iter().copied()).collect(),
            Module {
                top_level, main_content, ..
            } => top_level.iter().copied().chain(main_content.iter().copied()).collect(),
            Import { .. } => vec![],
            Generic { type_params, decl } => type_params.iter().copied().chain(std::iter::once(*decl)).collect(),
            TypeParameter { constraint, default, .. } => constraint.iter().copied().chain(default.iter().copied()).collect(),
            ArrayType { size, element } => size.iter().copied().chain(std::iter::once(*element)).collect(),
            TupleType(elems) | UnionType(elems) => elems.iter().copied().collect(),
            PointerType(t) | ReferenceType(t) | OptionalType(t) | ResultType(t) => vec![*t],
            FunctionType { params, return_type } => params.iter().copied().chain(std::iter::once(*return_type)).collect(),
        }
    }

    /// The display tag used by the S-expression formatter: e.g. `Int`,
    /// `BinaryExpr`, `Identifier`. Kept next to the enum so the two never
    /// drift apart as variants are added.
    pub fn tag(&self) -> &'static str {
        use NodeKind::*;
        match self {
            Literal(Literal::Int(..)) => "Int",
            Literal(Literal::Float(..)) => "Float",
            Literal(Literal::Char(_)) => "Char",
            Literal(Literal::Str(_)) => "String",
            Literal(Literal::Bool(_)) => "Bool",
            Literal(Literal::Null) => "Null",
            Identifier { .. } => "Identifier",
            QualifiedPath { .. } => "QualifiedPath",
            Unary { .. } => "UnaryExpr",
            Binary { .. } => "Binary",
            Ternary { .. } => "TernaryExpr",
            Assignment { .. } => "AssignExpr",
            Group(_) => "GroupExpr",
            Cast { .. } => "CastExpr",
            Is { .. } => "IsExpr",
            Call { .. } => "CallExpr",
            Index { .. } => "IndexExpr",
            Member { .. } => "MemberExpr",
            Array(_) => "ArrayExpr",
            Tuple(_) => "TupleExpr",
            StructLiteral { .. } => "StructExpr",
            MacroCall { .. } => "MacroCallExpr",
            Closure { .. } => "ClosureExpr",
            Range { .. } => "RangeExpr",
            Spread(_) => "SpreadExpr",
            StringExpr(_) => "StringExpr",
            ExprStmt(_) => "ExprStmt",
            Break => "BreakStmt",
            Continue => "ContinueStmt",
            Defer(_) => "DeferStmt",
            Return(_) => "ReturnStmt",
            Yield(_) => "YieldStmt",
            Block(_) => "BlockStmt",
            If { .. } => "IfStmt",
            For { .. } => "ForStmt",
            While { .. } => "WhileStmt",
            Switch { .. } => "SwitchStmt",
            Match { .. } => "MatchStmt",
            Variable { .. } => "VariableDeclaration",
            Func { .. } => "FuncDeclaration",
            FuncParam { .. } => "FuncParamDeclaration",
            TypeAlias { .. } => "TypeDeclaration",
            Enum { .. } => "EnumDeclaration",
            EnumOption { .. } => "EnumOptionDeclaration",
            Struct { is_class: true, .. } => "ClassDeclaration",
            Struct { is_class: false, .. } => "StructDeclaration",
            Field { .. } => "FieldDeclaration",
            Module { .. } => "ModuleDeclaration",
            Import { .. } => "ImportDeclaration",
            Generic { .. } => "GenericDeclaration",
            TypeParameter { .. } => "TypeParameterDeclaration",
            PrimitiveType(_) => "Type",
            ArrayType { .. } => "ArrayType",
            TupleType(_) => "TupleType",
            UnionType(_) => "UnionType",
            PointerType(_) => "PointerType",
            ReferenceType(_) => "ReferenceType",
            OptionalType(_) => "OptionalType",
            ResultType(_) => "ResultType",
            FunctionType { .. } => "FunctionType",
            Error => "Error",
        }
    }
}
