//! Relational expression tree pushed down by the host planner.
//!
//! Children are owned; the tree is immutable once built and is traversed in
//! source order.

use crate::macros::named_enum;
use crate::types::DataType;
use bigdecimal::BigDecimal;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    Select(Box<SelectStatement>),
    SelectList(SelectList),
    Column(Column),
    Table(Table),
    Join(Box<Join>),

    And(Vec<SqlNode>),
    Or(Vec<SqlNode>),
    Not(Box<SqlNode>),
    Comparison(Box<Comparison>),
    Between(Box<Between>),
    Like(Box<Like>),
    LikeRegexp(Box<LikeRegexp>),
    InList(Box<InList>),
    IsNull(Box<SqlNode>),
    IsNotNull(Box<SqlNode>),
    IsJson(Box<IsJson>),
    IsNotJson(Box<IsJson>),

    ScalarFunction(ScalarFunctionCall),
    Cast(Box<Cast>),
    Extract(Box<Extract>),
    Case(Box<Case>),
    JsonValue(Box<JsonValue>),

    AggregateFunction(AggregateFunctionCall),
    Listagg(Box<Listagg>),
    GroupConcat(Box<GroupConcat>),

    Literal(Literal),

    OrderBy(OrderBy),
    GroupBy(GroupBy),
    Limit(Limit),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub select_list: SelectList,
    /// A `Table` or a `Join`.
    pub from: SqlNode,
    pub filter: Option<SqlNode>,
    pub group_by: Option<GroupBy>,
    pub having: Option<SqlNode>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
}

impl SelectStatement {
    pub fn new(select_list: SelectList, from: SqlNode) -> Self {
        Self {
            select_list,
            from,
            filter: None,
            group_by: None,
            having: None,
            order_by: None,
            limit: None,
        }
    }

    pub fn with_filter(mut self, filter: SqlNode) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }

    pub fn with_having(mut self, having: SqlNode) -> Self {
        self.having = Some(having);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectList {
    /// No particular column is needed, only whether rows exist.
    AnyValue,
    Star,
    Expressions(Vec<SqlNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub table_name: Option<String>,
    pub table_alias: Option<String>,
}

impl Column {
    pub fn new(table_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: Some(table_name.into()),
            table_alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = Some(alias.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub alias: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// An alias equal to the table name is not rendered.
    pub fn effective_alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|a| *a != self.name)
    }
}

named_enum! {
    pub enum JoinType {
        Inner => "INNER",
        LeftOuter => "LEFT_OUTER",
        RightOuter => "RIGHT_OUTER",
        FullOuter => "FULL_OUTER",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub left: SqlNode,
    pub right: SqlNode,
    pub condition: SqlNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub operator: ComparisonOperator,
    pub left: SqlNode,
    pub right: SqlNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Between {
    pub expression: SqlNode,
    pub lower: SqlNode,
    pub upper: SqlNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Like {
    pub left: SqlNode,
    pub pattern: SqlNode,
    pub escape: Option<SqlNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LikeRegexp {
    pub left: SqlNode,
    pub pattern: SqlNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InList {
    pub expression: SqlNode,
    pub arguments: Vec<SqlNode>,
}

named_enum! {
    pub enum JsonTypeConstraint {
        Value => "VALUE",
        Array => "ARRAY",
        Object => "OBJECT",
        Scalar => "SCALAR",
    }
}

named_enum! {
    pub enum KeyUniqueness {
        WithUniqueKeys => "WITH UNIQUE KEYS",
        WithoutUniqueKeys => "WITHOUT UNIQUE KEYS",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsJson {
    pub expression: SqlNode,
    pub type_constraint: JsonTypeConstraint,
    pub key_uniqueness: KeyUniqueness,
}

named_enum! {
    /// Scalar functions the host planner can push down. The same names are
    /// used as scalar function capabilities.
    pub enum ScalarFunction {
        // arithmetic
        Add => "ADD",
        Sub => "SUB",
        Mult => "MULT",
        FloatDiv => "FLOAT_DIV",
        Neg => "NEG",
        // numeric
        Abs => "ABS",
        Acos => "ACOS",
        Asin => "ASIN",
        Atan => "ATAN",
        Atan2 => "ATAN2",
        Ceil => "CEIL",
        Cos => "COS",
        Cosh => "COSH",
        Cot => "COT",
        Degrees => "DEGREES",
        Div => "DIV",
        Exp => "EXP",
        Floor => "FLOOR",
        Ln => "LN",
        Log => "LOG",
        Mod => "MOD",
        Power => "POWER",
        Radians => "RADIANS",
        Rand => "RAND",
        Round => "ROUND",
        Sign => "SIGN",
        Sin => "SIN",
        Sinh => "SINH",
        Sqrt => "SQRT",
        Tan => "TAN",
        Tanh => "TANH",
        Trunc => "TRUNC",
        // string
        Ascii => "ASCII",
        BitLength => "BIT_LENGTH",
        Chr => "CHR",
        Concat => "CONCAT",
        Initcap => "INITCAP",
        Insert => "INSERT",
        Instr => "INSTR",
        Length => "LENGTH",
        Locate => "LOCATE",
        Lower => "LOWER",
        Lpad => "LPAD",
        Ltrim => "LTRIM",
        OctetLength => "OCTET_LENGTH",
        RegexpInstr => "REGEXP_INSTR",
        RegexpReplace => "REGEXP_REPLACE",
        RegexpSubstr => "REGEXP_SUBSTR",
        Repeat => "REPEAT",
        Replace => "REPLACE",
        Reverse => "REVERSE",
        Right => "RIGHT",
        Rpad => "RPAD",
        Rtrim => "RTRIM",
        Soundex => "SOUNDEX",
        Space => "SPACE",
        Substr => "SUBSTR",
        Translate => "TRANSLATE",
        Trim => "TRIM",
        Unicode => "UNICODE",
        Unicodechr => "UNICODECHR",
        Upper => "UPPER",
        // date and time
        AddDays => "ADD_DAYS",
        AddHours => "ADD_HOURS",
        AddMinutes => "ADD_MINUTES",
        AddMonths => "ADD_MONTHS",
        AddSeconds => "ADD_SECONDS",
        AddWeeks => "ADD_WEEKS",
        AddYears => "ADD_YEARS",
        ConvertTz => "CONVERT_TZ",
        CurrentDate => "CURRENT_DATE",
        CurrentTimestamp => "CURRENT_TIMESTAMP",
        DateTrunc => "DATE_TRUNC",
        Day => "DAY",
        DaysBetween => "DAYS_BETWEEN",
        Dbtimezone => "DBTIMEZONE",
        Extract => "EXTRACT",
        HoursBetween => "HOURS_BETWEEN",
        Localtimestamp => "LOCALTIMESTAMP",
        Minute => "MINUTE",
        MinutesBetween => "MINUTES_BETWEEN",
        Month => "MONTH",
        MonthsBetween => "MONTHS_BETWEEN",
        Numtodsinterval => "NUMTODSINTERVAL",
        Numtoyminterval => "NUMTOYMINTERVAL",
        PosixTime => "POSIX_TIME",
        Second => "SECOND",
        SecondsBetween => "SECONDS_BETWEEN",
        Sessiontimezone => "SESSIONTIMEZONE",
        Sysdate => "SYSDATE",
        Systimestamp => "SYSTIMESTAMP",
        Week => "WEEK",
        Year => "YEAR",
        YearsBetween => "YEARS_BETWEEN",
        // conversion
        Cast => "CAST",
        IsNumber => "IS_NUMBER",
        IsBoolean => "IS_BOOLEAN",
        IsDate => "IS_DATE",
        IsDsinterval => "IS_DSINTERVAL",
        IsYminterval => "IS_YMINTERVAL",
        IsTimestamp => "IS_TIMESTAMP",
        ToChar => "TO_CHAR",
        ToDate => "TO_DATE",
        ToDsinterval => "TO_DSINTERVAL",
        ToYminterval => "TO_YMINTERVAL",
        ToNumber => "TO_NUMBER",
        ToTimestamp => "TO_TIMESTAMP",
        // bitwise
        BitAnd => "BIT_AND",
        BitCheck => "BIT_CHECK",
        BitNot => "BIT_NOT",
        BitOr => "BIT_OR",
        BitSet => "BIT_SET",
        BitToNum => "BIT_TO_NUM",
        BitXor => "BIT_XOR",
        // other
        Case => "CASE",
        CurrentSchema => "CURRENT_SCHEMA",
        CurrentSession => "CURRENT_SESSION",
        CurrentStatement => "CURRENT_STATEMENT",
        CurrentUser => "CURRENT_USER",
        Greatest => "GREATEST",
        HashMd5 => "HASH_MD5",
        HashSha => "HASH_SHA",
        HashSha1 => "HASH_SHA1",
        HashSha256 => "HASH_SHA256",
        HashSha512 => "HASH_SHA512",
        JsonValue => "JSON_VALUE",
        Least => "LEAST",
        Nullifzero => "NULLIFZERO",
        SysGuid => "SYS_GUID",
        Zeroifnull => "ZEROIFNULL",
    }
}

impl ScalarFunction {
    /// Functions rendered by the generic `name(args)` path. The others have
    /// their own node types and cannot be aliased.
    pub fn is_simple(&self) -> bool {
        !matches!(
            self,
            ScalarFunction::Cast
                | ScalarFunction::Extract
                | ScalarFunction::Case
                | ScalarFunction::JsonValue
        )
    }
}

named_enum! {
    pub enum AggregateFunction {
        ApproximateCountDistinct => "APPROXIMATE_COUNT_DISTINCT",
        Avg => "AVG",
        Count => "COUNT",
        Every => "EVERY",
        FirstValue => "FIRST_VALUE",
        GroupConcat => "GROUP_CONCAT",
        LastValue => "LAST_VALUE",
        Listagg => "LISTAGG",
        Max => "MAX",
        Median => "MEDIAN",
        Min => "MIN",
        Mul => "MUL",
        Some => "SOME",
        Stddev => "STDDEV",
        StddevPop => "STDDEV_POP",
        StddevSamp => "STDDEV_SAMP",
        Sum => "SUM",
        Variance => "VARIANCE",
        VarPop => "VAR_POP",
        VarSamp => "VAR_SAMP",
    }
}

impl AggregateFunction {
    pub fn is_simple(&self) -> bool {
        !matches!(self, AggregateFunction::GroupConcat | AggregateFunction::Listagg)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarFunctionCall {
    pub function: ScalarFunction,
    pub arguments: Vec<SqlNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    pub expression: SqlNode,
    pub data_type: DataType,
}

named_enum! {
    pub enum ExtractField {
        Year => "YEAR",
        Month => "MONTH",
        Day => "DAY",
        Hour => "HOUR",
        Minute => "MINUTE",
        Second => "SECOND",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extract {
    pub field: ExtractField,
    pub expression: SqlNode,
}

/// `CASE [basis] WHEN arguments[i] THEN results[i] ... [ELSE last] END`.
/// A `results` list one longer than `arguments` carries the ELSE branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub basis: Option<SqlNode>,
    pub arguments: Vec<SqlNode>,
    pub results: Vec<SqlNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonBehavior {
    Null,
    Error,
    Default(SqlNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonValue {
    /// Document expression followed by the path.
    pub arguments: Vec<SqlNode>,
    pub returning: DataType,
    pub empty_behavior: JsonBehavior,
    pub error_behavior: JsonBehavior,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateFunctionCall {
    pub function: AggregateFunction,
    pub arguments: Vec<SqlNode>,
    pub distinct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListaggOverflow {
    Error,
    Truncate {
        filler: Option<String>,
        with_count: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listagg {
    pub argument: SqlNode,
    pub distinct: bool,
    pub separator: Option<String>,
    pub overflow: ListaggOverflow,
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupConcat {
    pub argument: SqlNode,
    pub distinct: bool,
    pub order_by: Option<OrderBy>,
    pub separator: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Null,
    String(String),
    Double(f64),
    ExactNumeric(BigDecimal),
    Date(String),
    Timestamp(String),
    TimestampUtc(String),
    Interval { value: String, data_type: DataType },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expression: SqlNode,
    pub ascending: bool,
    pub nulls_last: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub items: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub expressions: Vec<SqlNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub limit: u64,
    pub offset: u64,
}

impl Limit {
    pub fn new(limit: u64) -> Self {
        Self { limit, offset: 0 }
    }

    pub fn with_offset(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }
}

// Shorthands used by the planner bridge and tests.
impl SqlNode {
    pub fn column(table: &str, name: &str) -> Self {
        SqlNode::Column(Column::new(table, name))
    }

    pub fn table(name: &str) -> Self {
        SqlNode::Table(Table::new(name))
    }

    pub fn bool(value: bool) -> Self {
        SqlNode::Literal(Literal::Bool(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        SqlNode::Literal(Literal::String(value.into()))
    }

    pub fn double(value: f64) -> Self {
        SqlNode::Literal(Literal::Double(value))
    }

    pub fn exact(value: BigDecimal) -> Self {
        SqlNode::Literal(Literal::ExactNumeric(value))
    }

    pub fn not(inner: SqlNode) -> Self {
        SqlNode::Not(Box::new(inner))
    }

    pub fn compare(operator: ComparisonOperator, left: SqlNode, right: SqlNode) -> Self {
        SqlNode::Comparison(Box::new(Comparison {
            operator,
            left,
            right,
        }))
    }

    pub fn scalar(function: ScalarFunction, arguments: Vec<SqlNode>) -> Self {
        SqlNode::ScalarFunction(ScalarFunctionCall {
            function,
            arguments,
        })
    }

    pub fn aggregate(function: AggregateFunction, arguments: Vec<SqlNode>, distinct: bool) -> Self {
        SqlNode::AggregateFunction(AggregateFunctionCall {
            function,
            arguments,
            distinct,
        })
    }

    pub fn select(statement: SelectStatement) -> Self {
        SqlNode::Select(Box::new(statement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_names_parse_back() {
        assert_eq!("FLOAT_DIV".parse::<ScalarFunction>(), Ok(ScalarFunction::FloatDiv));
        assert_eq!("GROUP_CONCAT".parse::<AggregateFunction>(), Ok(AggregateFunction::GroupConcat));
        assert_eq!("float_div".parse::<ScalarFunction>(), Err("float_div".to_string()));
    }

    #[test]
    fn test_simple_subset() {
        assert!(ScalarFunction::Upper.is_simple());
        assert!(!ScalarFunction::Cast.is_simple());
        assert!(!ScalarFunction::JsonValue.is_simple());
        assert!(!AggregateFunction::Listagg.is_simple());
        assert!(AggregateFunction::Count.is_simple());
    }

    #[test]
    fn test_table_alias_equal_to_name_is_ignored() {
        assert_eq!(Table::new("T").with_alias("T").effective_alias(), None);
        assert_eq!(Table::new("T").with_alias("A").effective_alias(), Some("A"));
    }
}
