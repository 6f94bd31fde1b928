use hashbrown::HashMap;

use crate::{
    backend::{EmitOptions, RegisterScope},
    frontend::ast::BinaryOperatorKind,
    index::{Index, IndexVec, simple_index},
    middle::tac::{self, Operand, Place},
};

simple_index! {
    /// A symbolic register, printed as `r1`, `r2`, ...
    pub struct RegisterId;
}

impl core::fmt::Display for RegisterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.index() + 1)
    }
}

#[derive(Debug)]
struct Binding {
    register: RegisterId,
    /// Function that was being emitted when the binding was made
    function: Option<String>,
}

pub struct Assembler<'a> {
    output: String,
    options: &'a EmitOptions,
    registers: IndexVec<RegisterId, Operand>,
    bindings: HashMap<Operand, Binding>,
    current_function: Option<String>,
    /// Variables that reused a register bound outside the current function
    aliases: Vec<(Place, RegisterId)>,
}

impl<'a> Assembler<'a> {
    pub fn new(options: &'a EmitOptions) -> Self {
        Self {
            output: String::new(),
            options,
            registers: IndexVec::new(),
            bindings: HashMap::new(),
            current_function: None,
            aliases: Vec::new(),
        }
    }

    pub fn aliases(&self) -> &[(Place, RegisterId)] {
        &self.aliases
    }

    pub fn into_output(self) -> String {
        log::debug!("bound {} registers", self.registers.len());

        for (register, operand) in self.registers.enumerate() {
            log::trace!("{register} <- {operand}");
        }

        self.output
    }

    fn push_line(&mut self, string: impl AsRef<str>) {
        self.output.push_str(string.as_ref());
        self.output.push('\n');
    }

    pub fn emit(&mut self, string: impl AsRef<str>) {
        self.output.push_str("    ");
        self.push_line(string);
    }

    pub fn label(&mut self, name: impl AsRef<str>) {
        self.push_line(format!("{}:", name.as_ref()));
    }

    pub fn comment(&mut self, comment: impl AsRef<str>) {
        self.emit(format!("; {}", comment.as_ref()));
    }

    pub fn function_prologue(&mut self) {
        self.emit("push fp");
        self.emit("mov fp, sp");
    }

    pub fn function_epilogue(&mut self) {
        self.emit("mov sp, fp");
        self.emit("pop fp");
        self.emit("ret");
    }

    /// Returns the register bound to `operand`, binding the next free one on
    /// first sight.
    pub fn register_for(&mut self, operand: &Operand) -> RegisterId {
        if let Some(binding) = self.bindings.get_mut(operand) {
            if let Operand::Place(place @ Place::Variable(_)) = operand {
                if binding.function != self.current_function {
                    log::warn!(
                        "variable `{place}` in {} shares {} with `{place}` in {}",
                        scope_name(self.current_function.as_deref()),
                        binding.register,
                        scope_name(binding.function.as_deref())
                    );
                    self.aliases.push((place.clone(), binding.register));
                    binding.function = self.current_function.clone();
                }
            }

            return binding.register;
        }

        let register = self.registers.push(operand.clone());

        self.bindings.insert(
            operand.clone(),
            Binding {
                register,
                function: self.current_function.clone(),
            },
        );

        register
    }

    /// `#value` for integer constants, a register for everything else
    fn source_operand(&mut self, operand: &Operand) -> String {
        match immediate(operand) {
            Some(text) => format!("#{text}"),
            None => self.register_for(operand).to_string(),
        }
    }

    fn enter_function(&mut self, name: &str) {
        if self.options.register_scope == RegisterScope::Function {
            self.registers.clear();
            self.bindings.clear();
        }

        self.current_function = Some(name.to_owned());
    }

    pub fn emit_instruction(&mut self, instruction: &tac::Instruction) {
        if self.options.annotate {
            self.comment(strip_ansi_escapes::strip_str(instruction.to_string()));
        }

        match instruction {
            tac::Instruction::Label(name) => {
                self.enter_function(name);
                self.label(name);
                self.function_prologue();
            }
            tac::Instruction::End(_) => {
                self.function_epilogue();
                self.current_function = None;
            }
            // Reserved for a real allocator
            tac::Instruction::Parameter(_) | tac::Instruction::Declare(_) => {}
            tac::Instruction::Copy { target, source } => {
                let source = self.source_operand(source);
                let destination = self.register_for(&Operand::Place(target.clone()));

                self.emit(format!("mov {destination}, {source}"));
            }
            tac::Instruction::Binary {
                target,
                lhs,
                operator,
                rhs,
            } => {
                let lhs = self.source_operand(lhs);
                let rhs = self.source_operand(rhs);
                let destination = self.register_for(&Operand::Place(target.clone()));

                self.emit(format!(
                    "{} {destination}, {lhs}, {rhs}",
                    opcode(*operator)
                ));
            }
        }
    }
}

/// Integer constants of any width, kept as written
fn immediate(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Constant(value)
            if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Some(value)
        }
        Operand::Constant(_) | Operand::Place(_) => None,
    }
}

fn scope_name(function: Option<&str>) -> String {
    match function {
        Some(name) => format!("`{name}`"),
        None => "the top level".to_owned(),
    }
}

fn opcode(operator: BinaryOperatorKind) -> String {
    match operator {
        BinaryOperatorKind::Add => "add".to_owned(),
        BinaryOperatorKind::Subtract => "sub".to_owned(),
        BinaryOperatorKind::Multiply => "mul".to_owned(),
        BinaryOperatorKind::Divide => "div".to_owned(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        backend::emit_assembly,
        frontend::{SourceFile, lexer::Lexer, parser::Parser},
        middle::tac::ast_lowering::lower_program,
    };

    fn lower(input: &str) -> tac::Program {
        let source = SourceFile::in_memory(input);
        let tokens = Lexer::new(&source).tokenize().unwrap();
        let program = Parser::parse(tokens).unwrap();

        lower_program(&program).unwrap()
    }

    fn compile(input: &str, options: &EmitOptions) -> String {
        emit_assembly(&lower(input), options)
    }

    fn aliases(input: &str, options: &EmitOptions) -> Vec<(String, String)> {
        let mut assembler = Assembler::new(options);

        for instruction in &lower(input).instructions {
            assembler.emit_instruction(instruction);
        }

        assembler
            .aliases()
            .iter()
            .map(|(place, register)| (place.to_string(), register.to_string()))
            .collect()
    }

    #[test]
    fn main_function() {
        assert_eq!(
            compile(
                "int main() { int x = 2; int y = x + 3; }",
                &EmitOptions::default()
            ),
            indoc! {"
                main:
                    push fp
                    mov fp, sp
                    mov r1, #2
                    add r2, r1, #3
                    mov r3, r2
                    mov sp, fp
                    pop fp
                    ret
            "}
        );
    }

    #[test]
    fn opcode_table() {
        assert_eq!(
            compile(
                "void f() { int a = b + c; a = b - c; a = b * c; a = b / c; a = b < c; a = b == c; }",
                &EmitOptions::default()
            ),
            indoc! {"
                f:
                    push fp
                    mov fp, sp
                    add r3, r1, r2
                    mov r4, r3
                    sub r5, r1, r2
                    mov r4, r5
                    mul r6, r1, r2
                    mov r4, r6
                    div r7, r1, r2
                    mov r4, r7
                    < r8, r1, r2
                    mov r4, r8
                    == r9, r1, r2
                    mov r4, r9
                    mov sp, fp
                    pop fp
                    ret
            "}
        );
    }

    #[test]
    fn places_keep_their_register() {
        let options = EmitOptions::default();
        let mut assembler = Assembler::new(&options);

        let x = Operand::variable("x");
        let t0 = Operand::Place(Place::Temporary(tac::TemporaryId::new(0)));

        let first = assembler.register_for(&x);
        assert_eq!(assembler.register_for(&t0).to_string(), "r2");
        assert_eq!(assembler.register_for(&x), first);
        assert_eq!(first.to_string(), "r1");
    }

    #[test]
    fn integer_constants_are_immediates() {
        assert_eq!(
            compile("int a = 10 * 20;", &EmitOptions::default()),
            "    mul r1, #10, #20\n    mov r2, r1\n"
        );
    }

    #[test]
    fn wide_integer_constants_are_immediates() {
        assert_eq!(
            compile("int x = 99999999999999999999 + 1;", &EmitOptions::default()),
            "    add r1, #99999999999999999999, #1\n    mov r2, r1\n"
        );
    }

    #[test]
    fn non_integer_constants_get_registers() {
        assert_eq!(
            compile("float f = 1.5; float g = 1.5 + f;", &EmitOptions::default()),
            indoc! {"
                mov r2, r1
                add r3, r1, r2
                mov r4, r3
            "}
            .lines()
            .map(|l| format!("    {l}\n"))
            .collect::<String>()
        );
    }

    #[test]
    fn declarations_and_parameters_emit_nothing() {
        assert_eq!(
            compile("void f(int a) { int b; b = a; }", &EmitOptions::default()),
            indoc! {"
                f:
                    push fp
                    mov fp, sp
                    mov r2, r1
                    mov sp, fp
                    pop fp
                    ret
            "}
        );
    }

    #[test]
    fn program_scope_aliases_registers_across_functions() {
        let source = "int f() { int x = 1; } int g() { int y = 2; int x = y; }";

        assert_eq!(
            compile(source, &EmitOptions::default()),
            indoc! {"
                f:
                    push fp
                    mov fp, sp
                    mov r1, #1
                    mov sp, fp
                    pop fp
                    ret
                g:
                    push fp
                    mov fp, sp
                    mov r2, #2
                    mov r1, r2
                    mov sp, fp
                    pop fp
                    ret
            "}
        );
    }

    #[test]
    fn function_scope_restarts_registers() {
        let source = "int f() { int x = 1; } int g() { int y = 2; int x = y; }";
        let options = EmitOptions {
            register_scope: RegisterScope::Function,
            annotate: false,
        };

        assert_eq!(
            compile(source, &options),
            indoc! {"
                f:
                    push fp
                    mov fp, sp
                    mov r1, #1
                    mov sp, fp
                    pop fp
                    ret
                g:
                    push fp
                    mov fp, sp
                    mov r1, #2
                    mov r2, r1
                    mov sp, fp
                    pop fp
                    ret
            "}
        );
    }

    #[test]
    fn annotations() {
        let options = EmitOptions {
            register_scope: RegisterScope::Program,
            annotate: true,
        };

        assert_eq!(
            compile("int x; int y = 4 - 1;", &options),
            [
                "; DECLARE x",
                "; t0 = 4 - 1",
                "sub r1, #4, #1",
                "; y = t0",
                "mov r2, r1",
            ]
            .iter()
            .map(|line| format!("    {line}\n"))
            .collect::<String>()
        );
    }

    #[test]
    fn variable_shared_between_functions_is_an_alias() {
        assert_eq!(
            aliases(
                "int f() { int x = 1; } int g() { int x = 2; x = x + 1; }",
                &EmitOptions::default()
            ),
            vec![("x".to_owned(), "r1".to_owned())]
        );
    }

    #[test]
    fn top_level_variable_reused_in_function_is_an_alias() {
        assert_eq!(
            aliases("int x = 1; int f() { x = 2; }", &EmitOptions::default()),
            vec![("x".to_owned(), "r1".to_owned())]
        );
    }

    #[test]
    fn shared_constants_are_not_aliases() {
        assert_eq!(
            aliases(
                "int f() { float a = 1.5; } int g() { float b = 1.5; }",
                &EmitOptions::default()
            ),
            vec![]
        );
    }

    #[test]
    fn function_scope_has_no_aliases() {
        let options = EmitOptions {
            register_scope: RegisterScope::Function,
            annotate: false,
        };

        assert_eq!(
            aliases(
                "int x = 1; int f() { int x = 1; } int g() { int x = 2; }",
                &options
            ),
            vec![]
        );
    }
}
